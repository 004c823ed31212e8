//! PowerPoint decks written as a minimal PresentationML package.

use std::fmt::Write as _;
use std::io::{Cursor, Write};
use std::path::Path;

use async_trait::async_trait;
use rand_chacha::ChaCha8Rng;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use populator_core::ContentKind;

use super::{RenderError, Renderer, encode_blocking, escape_markup as esc, write_bytes};
use crate::content::{ContentGenerator, Slide};

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const CT_BASE: &str = "application/vnd.openxmlformats-officedocument";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// English Metric Units per inch.
const EMU: i64 = 914_400;

/// `.pptx` decks: a title slide followed by bullet slides.
#[derive(Debug, Clone)]
pub struct PptxRenderer {
    content: ContentGenerator,
}

impl PptxRenderer {
    pub fn new(content: ContentGenerator) -> Self {
        Self { content }
    }
}

#[async_trait]
impl Renderer for PptxRenderer {
    fn name(&self) -> &'static str {
        "pptx"
    }

    async fn render(
        &self,
        path: &Path,
        _content: ContentKind,
        rng: &mut ChaCha8Rng,
    ) -> Result<u64, RenderError> {
        let slides = self.content.slides(rng);
        let bytes = encode_blocking(move || encode_pptx(&slides)).await?;
        write_bytes(path, bytes).await
    }
}

pub(crate) fn encode_pptx(slides: &[Slide]) -> Result<Vec<u8>, RenderError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let mut parts: Vec<(String, String)> = vec![
        ("[Content_Types].xml".to_string(), content_types(slides.len())),
        ("_rels/.rels".to_string(), root_rels()),
        ("ppt/presentation.xml".to_string(), presentation(slides.len())),
        (
            "ppt/_rels/presentation.xml.rels".to_string(),
            presentation_rels(slides.len()),
        ),
        ("ppt/slideMasters/slideMaster1.xml".to_string(), slide_master()),
        (
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            rels(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "theme", "../theme/theme1.xml"),
            ]),
        ),
        ("ppt/slideLayouts/slideLayout1.xml".to_string(), slide_layout()),
        (
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
            rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
        ),
        ("ppt/theme/theme1.xml".to_string(), theme()),
    ];
    for (index, slide) in slides.iter().enumerate() {
        let number = index + 1;
        parts.push((
            format!("ppt/slides/slide{number}.xml"),
            slide_xml(slide, index == 0),
        ));
        parts.push((
            format!("ppt/slides/_rels/slide{number}.xml.rels"),
            rels(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]),
        ));
    }

    for (name, xml) in parts {
        zip.start_file(name, options)?;
        zip.write_all(xml.as_bytes())?;
    }
    Ok(zip.finish()?.into_inner())
}

fn content_types(slide_count: usize) -> String {
    let mut xml = format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>"#
    );
    let overrides = [
        ("/ppt/presentation.xml", "presentationml.presentation.main+xml"),
        ("/ppt/slideMasters/slideMaster1.xml", "presentationml.slideMaster+xml"),
        ("/ppt/slideLayouts/slideLayout1.xml", "presentationml.slideLayout+xml"),
        ("/ppt/theme/theme1.xml", "theme+xml"),
    ];
    for (part, kind) in overrides {
        let _ = write!(xml, r#"<Override PartName="{part}" ContentType="{CT_BASE}.{kind}"/>"#);
    }
    for number in 1..=slide_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{number}.xml" ContentType="{CT_BASE}.presentationml.slide+xml"/>"#
        );
    }
    xml.push_str("</Types>");
    xml
}

fn rels(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = format!(r#"{XML_DECL}<Relationships xmlns="{NS_RELS}">"#);
    for (id, kind, target) in entries {
        let _ = write!(
            xml,
            r#"<Relationship Id="{id}" Type="{REL_BASE}/{kind}" Target="{target}"/>"#
        );
    }
    xml.push_str("</Relationships>");
    xml
}

fn root_rels() -> String {
    rels(&[("rId1", "officeDocument", "ppt/presentation.xml")])
}

/// rId1 is the master, rId2 the theme and slides start at rId3.
fn presentation_rels(slide_count: usize) -> String {
    let slide_targets: Vec<(String, String)> = (1..=slide_count)
        .map(|number| (format!("rId{}", number + 2), format!("slides/slide{number}.xml")))
        .collect();
    let mut entries = vec![
        ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
        ("rId2", "theme", "theme/theme1.xml"),
    ];
    entries.extend(
        slide_targets
            .iter()
            .map(|(id, target)| (id.as_str(), "slide", target.as_str())),
    );
    rels(&entries)
}

fn presentation(slide_count: usize) -> String {
    let mut slide_ids = String::new();
    for number in 1..=slide_count {
        let _ = write!(
            slide_ids,
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            255 + number,
            number + 2
        );
    }
    format!(
        r#"{XML_DECL}<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{slide_ids}</p:sldIdLst><p:sldSz cx="{}" cy="{}" type="screen4x3"/><p:notesSz cx="{}" cy="{}"/></p:presentation>"#,
        10 * EMU,
        15 * EMU / 2,
        15 * EMU / 2,
        10 * EMU
    )
}

const EMPTY_TREE: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

fn slide_master() -> String {
    format!(
        r#"{XML_DECL}<p:sldMaster xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:spTree>{EMPTY_TREE}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#
    )
}

fn slide_layout() -> String {
    format!(
        r#"{XML_DECL}<p:sldLayout xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{EMPTY_TREE}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#
    )
}

fn theme() -> String {
    let colors = [
        ("dk1", "000000"),
        ("lt1", "FFFFFF"),
        ("dk2", "1F497D"),
        ("lt2", "EEECE1"),
        ("accent1", "4F81BD"),
        ("accent2", "C0504D"),
        ("accent3", "9BBB59"),
        ("accent4", "8064A2"),
        ("accent5", "4BACC6"),
        ("accent6", "F79646"),
        ("hlink", "0000FF"),
        ("folHlink", "800080"),
    ];
    let mut scheme = String::new();
    for (name, rgb) in colors {
        let _ = write!(scheme, r#"<a:{name}><a:srgbClr val="{rgb}"/></a:{name}>"#);
    }
    let fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = r#"<a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#;
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";

    format!(
        r#"{XML_DECL}<a:theme xmlns:a="{NS_A}" name="Office Theme"><a:themeElements><a:clrScheme name="Office">{scheme}</a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst><a:lnStyleLst>{line}{line}{line}</a:lnStyleLst><a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst><a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#
    )
}

/// Position and size in inches.
struct Frame {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

fn inches(value: f64) -> i64 {
    (value * EMU as f64) as i64
}

fn text_box(id: usize, frame: Frame, paragraphs: &[String], size_pt: u32, bold: bool) -> String {
    let mut body = String::new();
    for text in paragraphs {
        let _ = write!(
            body,
            r#"<a:p><a:r><a:rPr lang="en-US" sz="{}" b="{}" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
            size_pt * 100,
            u8::from(bold),
            esc(text)
        );
    }
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr wrap="square"/><a:lstStyle/>{body}</p:txBody></p:sp>"#,
        inches(frame.x),
        inches(frame.y),
        inches(frame.width),
        inches(frame.height)
    )
}

fn slide_xml(slide: &Slide, is_title: bool) -> String {
    let shapes = if is_title {
        let mut shapes = text_box(
            2,
            Frame {
                x: 0.5,
                y: 2.5,
                width: 9.0,
                height: 1.5,
            },
            std::slice::from_ref(&slide.title),
            44,
            true,
        );
        shapes.push_str(&text_box(
            3,
            Frame {
                x: 0.5,
                y: 4.0,
                width: 9.0,
                height: 1.0,
            },
            &slide.bullets,
            24,
            false,
        ));
        shapes
    } else {
        let mut shapes = text_box(
            2,
            Frame {
                x: 0.5,
                y: 0.5,
                width: 9.0,
                height: 1.0,
            },
            std::slice::from_ref(&slide.title),
            32,
            true,
        );
        shapes.push_str(&text_box(
            3,
            Frame {
                x: 0.75,
                y: 1.75,
                width: 8.5,
                height: 5.0,
            },
            &slide.bullets,
            18,
            false,
        ));
        shapes
    };

    format!(
        r#"{XML_DECL}<p:sld xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}"><p:cSld><p:spTree>{EMPTY_TREE}{shapes}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#
    )
}
