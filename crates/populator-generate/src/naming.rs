use chrono::{Datelike, Duration, NaiveDate};
use fake::Fake;
use fake::faker::name::en::LastName;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore};

use populator_core::{Category, ContentKind, OutputKind};

use crate::sanitize::{SanitizeMode, sanitize_file_name};

/// Days back from the reference date that embedded file-name dates may fall on.
const DATE_WINDOW_DAYS: i64 = 730;

/// File name and templates chosen for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameChoice {
    pub file_name: String,
    pub output_kind: OutputKind,
    pub content_kind: ContentKind,
}

/// Supplies a file name and content templates for a category.
///
/// Implementations must draw randomness only from `rng` so a seeded run is
/// reproducible.
pub trait Namer: Send + Sync {
    fn name_for(&self, category: Category, rng: &mut dyn RngCore) -> NameChoice;
}

/// Business-document names such as `Budget_2024-03-11_v2.1.xlsx`.
#[derive(Debug, Clone)]
pub struct BusinessNamer {
    reference_date: NaiveDate,
    sanitize: SanitizeMode,
}

impl BusinessNamer {
    pub fn new(reference_date: NaiveDate, sanitize: SanitizeMode) -> Self {
        Self {
            reference_date,
            sanitize,
        }
    }

    fn pick_output_kind(
        &self,
        map: &[(OutputKind, &'static [ContentKind])],
        rng: &mut dyn RngCore,
    ) -> (OutputKind, &'static [ContentKind]) {
        map.choose_weighted(rng, |(kind, _)| kind.weight())
            .or_else(|_| map.first().ok_or(()))
            .map(|(kind, contents)| (*kind, *contents))
            .unwrap_or((OutputKind::Txt, &[ContentKind::Memo]))
    }

    fn date_component(&self, rng: &mut dyn RngCore) -> String {
        let offset = rng.random_range(0..=DATE_WINDOW_DAYS);
        let date = self.reference_date - Duration::days(offset);
        match rng.random_range(0..6) {
            0 => date.format("%Y%m%d").to_string(),
            1 => date.format("%Y-%m-%d").to_string(),
            2 => date.format("%Y_%m_%d").to_string(),
            3 => date.format("%m%d%Y").to_string(),
            4 => date.format("%Y%m").to_string(),
            _ => format!("Q{}_{}", quarter(date), date.year()),
        }
    }
}

impl Namer for BusinessNamer {
    fn name_for(&self, category: Category, rng: &mut dyn RngCore) -> NameChoice {
        let (output_kind, contents) = self.pick_output_kind(category.content_map(), rng);
        let prefix = category.prefixes().choose(rng).copied().unwrap_or("Document");

        let mut components = vec![prefix.to_string()];
        match rng.random_range(0..5) {
            0 => components.push(self.date_component(rng)),
            1 => components.push(version_component(rng)),
            2 => {
                components.push(self.date_component(rng));
                components.push(version_component(rng));
            }
            3 => {
                let last_name: String = LastName().fake_with_rng(rng);
                components.push(last_name);
                if rng.random_bool(0.5) {
                    components.push(self.date_component(rng));
                }
            }
            _ => {}
        }

        let file_name = format!("{}.{}", components.join("_"), output_kind.extension());
        let file_name = sanitize_file_name(&file_name, self.sanitize);
        let content_kind = contents.choose(rng).copied().unwrap_or(ContentKind::Memo);

        NameChoice {
            file_name,
            output_kind,
            content_kind,
        }
    }
}

fn version_component(rng: &mut dyn RngCore) -> String {
    match rng.random_range(0..6) {
        0 => format!("v{}.{}", rng.random_range(1..=5), rng.random_range(0..=9)),
        1 => format!("v{}", rng.random_range(1..=10)),
        2 => format!("rev{}", rng.random_range(1..=20)),
        3 => format!("draft{}", rng.random_range(1..=5)),
        4 => "final".to_string(),
        _ => "approved".to_string(),
    }
}

fn quarter(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn namer() -> BusinessNamer {
        let date = NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date");
        BusinessNamer::new(date, SanitizeMode::Never)
    }

    #[test]
    fn names_use_category_vocabulary() {
        let namer = namer();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for category in Category::ALL {
            for _ in 0..50 {
                let choice = namer.name_for(category, &mut rng);
                let map = category.content_map();
                let (_, contents) = map
                    .iter()
                    .find(|(kind, _)| *kind == choice.output_kind)
                    .expect("output kind belongs to category");
                assert!(contents.contains(&choice.content_kind));
                assert!(
                    category
                        .prefixes()
                        .iter()
                        .any(|prefix| choice.file_name.starts_with(prefix))
                );
                assert!(
                    choice
                        .file_name
                        .ends_with(&format!(".{}", choice.output_kind.extension()))
                );
            }
        }
    }

    #[test]
    fn same_seed_same_names() {
        let namer = namer();
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..20 {
            assert_eq!(
                namer.name_for(Category::Finance, &mut a),
                namer.name_for(Category::Finance, &mut b)
            );
        }
    }

    #[test]
    fn quarter_boundaries() {
        let q = |m| quarter(NaiveDate::from_ymd_opt(2024, m, 1).expect("valid date"));
        assert_eq!(q(1), 1);
        assert_eq!(q(3), 1);
        assert_eq!(q(4), 2);
        assert_eq!(q(12), 4);
    }
}
