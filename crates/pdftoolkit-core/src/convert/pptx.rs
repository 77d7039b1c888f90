//! PowerPoint (.pptx) conversions
//!
//! Slides are in `ppt/slides/slideN.xml`. Written presentations carry the
//! smallest master/layout/theme set PowerPoint accepts.

use super::extract::page_texts;
use super::layout::TextLayout;
use super::ooxml::{
    collect_paragraphs, content_types, escape_text, relationships, OFFICE_DOCUMENT_REL, XML_HEADER,
};
use crate::archive::{open_package, read_part, ZipPackage};
use crate::error::ToolkitError;

const NAMESPACES: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const EMPTY_TREE: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

/// 4:3 slide in EMU
const SLIDE_WIDTH: u64 = 9_144_000;
const SLIDE_HEIGHT: u64 = 6_858_000;
const TEXT_INSET: u64 = 457_200;

const THEME: &str = r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="1F497D"/></a:dk2><a:lt2><a:srgbClr val="EEECE1"/></a:lt2><a:accent1><a:srgbClr val="4F81BD"/></a:accent1><a:accent2><a:srgbClr val="C0504D"/></a:accent2><a:accent3><a:srgbClr val="9BBB59"/></a:accent3><a:accent4><a:srgbClr val="8064A2"/></a:accent4><a:accent5><a:srgbClr val="4BACC6"/></a:accent5><a:accent6><a:srgbClr val="F79646"/></a:accent6><a:hlink><a:srgbClr val="0000FF"/></a:hlink><a:folHlink><a:srgbClr val="800080"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#;

/// Paragraphs of every slide, in slide-number order
pub fn read_slides(bytes: &[u8]) -> Result<Vec<Vec<String>>, ToolkitError> {
    let mut archive = open_package(bytes)?;

    let mut numbers: Vec<u32> = archive
        .file_names()
        .filter_map(|name| {
            name.strip_prefix("ppt/slides/slide")?
                .strip_suffix(".xml")?
                .parse()
                .ok()
        })
        .collect();
    numbers.sort_unstable();

    if numbers.is_empty() {
        return Err(ToolkitError::ConversionError(
            "No slides found in presentation".into(),
        ));
    }

    let mut slides = Vec::with_capacity(numbers.len());
    for number in numbers {
        let path = slide_path(number as usize);
        let xml = read_part(&mut archive, &path)?.ok_or_else(|| {
            ToolkitError::ConversionError(format!("{} disappeared from archive", path))
        })?;
        slides.push(collect_paragraphs(&xml)?);
    }

    Ok(slides)
}

/// One landscape page (or more, if the text overflows) per slide
pub fn pptx_to_pdf(bytes: &[u8]) -> Result<Vec<u8>, ToolkitError> {
    let slides = read_slides(bytes)?;
    TextLayout::landscape().render(&slides)
}

/// One slide per PDF page, holding that page's text
pub fn pdf_to_pptx(bytes: &[u8]) -> Result<Vec<u8>, ToolkitError> {
    let pages = page_texts(bytes)?;
    write_pptx(&pages)
}

/// Build a presentation with one text-box slide per entry
pub fn write_pptx(slides: &[String]) -> Result<Vec<u8>, ToolkitError> {
    let slide_count = slides.len().max(1);

    let mut overrides = vec![
        (
            "/ppt/presentation.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml",
        ),
        (
            "/ppt/slideMasters/slideMaster1.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml",
        ),
        (
            "/ppt/slideLayouts/slideLayout1.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml",
        ),
        (
            "/ppt/theme/theme1.xml".to_string(),
            "application/vnd.openxmlformats-officedocument.theme+xml",
        ),
    ];
    for n in 1..=slide_count {
        overrides.push((
            format!("/{}", slide_path(n)),
            "application/vnd.openxmlformats-officedocument.presentationml.slide+xml",
        ));
    }

    // rId1 master, rId2 theme, rId3.. slides
    let mut presentation_rels = vec![
        (
            "rId1".to_string(),
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster",
            "slideMasters/slideMaster1.xml".to_string(),
        ),
        (
            "rId2".to_string(),
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme",
            "theme/theme1.xml".to_string(),
        ),
    ];
    let mut slide_ids = String::new();
    for n in 1..=slide_count {
        let rel_id = format!("rId{}", n + 2);
        slide_ids.push_str(&format!(
            r#"<p:sldId id="{}" r:id="{}"/>"#,
            255 + n,
            rel_id
        ));
        presentation_rels.push((
            rel_id,
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide",
            format!("slides/slide{}.xml", n),
        ));
    }

    let presentation = format!(
        r#"{}<p:presentation {}><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="{}" cy="{}"/><p:notesSz cx="{}" cy="{}"/></p:presentation>"#,
        XML_HEADER, NAMESPACES, slide_ids, SLIDE_WIDTH, SLIDE_HEIGHT, SLIDE_HEIGHT, SLIDE_WIDTH
    );

    let master = format!(
        r#"{}<p:sldMaster {}><p:cSld><p:spTree>{}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#,
        XML_HEADER, NAMESPACES, EMPTY_TREE
    );

    let layout = format!(
        r#"{}<p:sldLayout {} type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        XML_HEADER, NAMESPACES, EMPTY_TREE
    );

    let layout_rel = [(
        "rId1".to_string(),
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout",
        "../slideLayouts/slideLayout1.xml".to_string(),
    )];

    let mut package = ZipPackage::new();
    package.add("[Content_Types].xml", content_types(&overrides).as_bytes())?;
    package.add(
        "_rels/.rels",
        relationships(&[(
            "rId1".to_string(),
            OFFICE_DOCUMENT_REL,
            "ppt/presentation.xml".to_string(),
        )])
        .as_bytes(),
    )?;
    package.add("ppt/presentation.xml", presentation.as_bytes())?;
    package.add(
        "ppt/_rels/presentation.xml.rels",
        relationships(&presentation_rels).as_bytes(),
    )?;
    package.add("ppt/slideMasters/slideMaster1.xml", master.as_bytes())?;
    package.add(
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        relationships(&[
            layout_rel[0].clone(),
            (
                "rId2".to_string(),
                "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme",
                "../theme/theme1.xml".to_string(),
            ),
        ])
        .as_bytes(),
    )?;
    package.add("ppt/slideLayouts/slideLayout1.xml", layout.as_bytes())?;
    package.add(
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        relationships(&[(
            "rId1".to_string(),
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster",
            "../slideMasters/slideMaster1.xml".to_string(),
        )])
        .as_bytes(),
    )?;
    package.add(
        "ppt/theme/theme1.xml",
        format!("{}{}", XML_HEADER, THEME).as_bytes(),
    )?;

    for n in 1..=slide_count {
        let text = slides.get(n - 1).map(String::as_str).unwrap_or("");
        package.add(&slide_path(n), slide_xml(text).as_bytes())?;
        package.add(
            &format!("ppt/slides/_rels/slide{}.xml.rels", n),
            relationships(&layout_rel).as_bytes(),
        )?;
    }

    package.finish()
}

fn slide_path(number: usize) -> String {
    format!("ppt/slides/slide{}.xml", number)
}

fn slide_xml(text: &str) -> String {
    let mut paragraphs = String::new();
    for line in text.lines() {
        paragraphs.push_str(&format!(
            r#"<a:p><a:r><a:rPr lang="en-US" sz="1400"/><a:t>{}</a:t></a:r></a:p>"#,
            escape_text(line)
        ));
    }
    if paragraphs.is_empty() {
        paragraphs.push_str("<a:p/>");
    }

    format!(
        r#"{}<p:sld {}><p:cSld><p:spTree>{}<p:sp><p:nvSpPr><p:cNvPr id="2" name="Text 1"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr wrap="square"><a:normAutofit/></a:bodyPr><a:lstStyle/>{}</p:txBody></p:sp></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        XML_HEADER,
        NAMESPACES,
        EMPTY_TREE,
        TEXT_INSET,
        TEXT_INSET,
        SLIDE_WIDTH - 2 * TEXT_INSET,
        SLIDE_HEIGHT - 2 * TEXT_INSET,
        paragraphs
    )
}
