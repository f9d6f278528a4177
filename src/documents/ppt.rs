// src/documents/ppt.rs
//
// Slide-deck renderer. A .pptx file is a zip archive of OOXML parts; the
// deck here is simple enough (title slide, bulleted content slides, closing
// slide) that the parts are assembled from templates instead of pulling in
// a presentation library. Styling is fixed: Calibri 18pt grey bullets,
// AliceBlue title/closing slides, white content slides.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::schema::SlideDeck;

// EMU per slide, 10 x 7.5 inches.
const SLIDE_CX: i64 = 9_144_000;
const SLIDE_CY: i64 = 6_858_000;

const TITLE_BACKGROUND: &str = "F0F8FF"; // AliceBlue
const CONTENT_BACKGROUND: &str = "FFFFFF";
const BULLET_COLOR: &str = "3C3C3C";
const BULLET_SIZE_CENTIPOINTS: u32 = 1800; // 18pt
const BULLET_SPACE_AFTER_CENTIPOINTS: u32 = 1600; // 16pt

pub fn build_pptx(deck: &SlideDeck) -> Result<Vec<u8>, String> {
    // Title + one slide per section + closing.
    let mut slides = Vec::with_capacity(deck.slides.len() + 2);
    slides.push(title_slide_xml(&deck.title, "Research Assistant", TITLE_BACKGROUND));
    for slide in &deck.slides {
        slides.push(content_slide_xml(&slide.title, &slide.bullets));
    }
    slides.push(title_slide_xml("Thank You!", "", TITLE_BACKGROUND));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    let mut put = |name: &str, body: &str| -> Result<(), String> {
        writer
            .start_file(name, options)
            .map_err(|e| format!("zip error: {}", e))?;
        writer
            .write_all(body.as_bytes())
            .map_err(|e| format!("zip error: {}", e))?;
        Ok(())
    };

    put("[Content_Types].xml", &content_types_xml(slides.len()))?;
    put("_rels/.rels", ROOT_RELS)?;
    put("ppt/presentation.xml", &presentation_xml(slides.len()))?;
    put(
        "ppt/_rels/presentation.xml.rels",
        &presentation_rels_xml(slides.len()),
    )?;
    put("ppt/slideMasters/slideMaster1.xml", SLIDE_MASTER)?;
    put("ppt/slideMasters/_rels/slideMaster1.xml.rels", MASTER_RELS)?;
    put("ppt/slideLayouts/slideLayout1.xml", SLIDE_LAYOUT)?;
    put("ppt/slideLayouts/_rels/slideLayout1.xml.rels", LAYOUT_RELS)?;
    put("ppt/theme/theme1.xml", THEME)?;

    for (idx, slide) in slides.iter().enumerate() {
        put(&format!("ppt/slides/slide{}.xml", idx + 1), slide)?;
        put(
            &format!("ppt/slides/_rels/slide{}.xml.rels", idx + 1),
            SLIDE_RELS,
        )?;
    }

    let cursor = writer
        .finish()
        .map_err(|e| format!("zip error: {}", e))?;
    Ok(cursor.into_inner())
}

pub fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn content_types_xml(slide_count: usize) -> String {
    let mut overrides = String::new();
    for i in 1..=slide_count {
        overrides.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            i
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>{}</Types>"#,
        overrides
    )
}

fn presentation_xml(slide_count: usize) -> String {
    let mut slide_ids = String::new();
    for i in 0..slide_count {
        // Slide relationship ids start at rId2; rId1 is the master.
        slide_ids.push_str(&format!(
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            256 + i,
            i + 2
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="{}" cy="{}"/><p:notesSz cx="{}" cy="{}"/></p:presentation>"#,
        slide_ids, SLIDE_CX, SLIDE_CY, SLIDE_CY, SLIDE_CX
    )
}

fn presentation_rels_xml(slide_count: usize) -> String {
    let mut rels = String::from(
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>"#,
    );
    for i in 0..slide_count {
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide{}.xml"/>"#,
            i + 2,
            i + 1
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        rels
    )
}

fn slide_shell(background: &str, shapes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld><p:clrMapOvr><a:overrideClrMapping bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/></p:clrMapOvr></p:sld>"#,
        background, shapes
    )
}

fn text_box(id: u32, name: &str, x: i64, y: i64, cx: i64, cy: i64, paragraphs: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr><p:txBody><a:bodyPr wrap="square"><a:normAutofit/></a:bodyPr><a:lstStyle/>{}</p:txBody></p:sp>"#,
        id, name, x, y, cx, cy, paragraphs
    )
}

fn title_slide_xml(title: &str, subtitle: &str, background: &str) -> String {
    let title_para = format!(
        r#"<a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="en-US" sz="4000" b="1" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
        xml_escape(title)
    );
    let subtitle_para = format!(
        r#"<a:p><a:pPr algn="ctr"/><a:r><a:rPr lang="en-US" sz="2000" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
        xml_escape(subtitle)
    );

    let shapes = format!(
        "{}{}",
        text_box(2, "Title", 457_200, 2_130_425, 8_229_600, 1_325_563, &title_para),
        text_box(3, "Subtitle", 457_200, 3_886_200, 8_229_600, 914_400, &subtitle_para),
    );
    slide_shell(background, &shapes)
}

fn content_slide_xml(heading: &str, bullets: &[String]) -> String {
    let heading_para = format!(
        r#"<a:p><a:r><a:rPr lang="en-US" sz="3200" b="1" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
        xml_escape(heading)
    );

    let mut bullet_paras = String::new();
    for bullet in bullets {
        bullet_paras.push_str(&format!(
            r#"<a:p><a:pPr lvl="0"><a:spcAft><a:spcPts val="{space}"/></a:spcAft><a:buChar char="&#8226;"/></a:pPr><a:r><a:rPr lang="en-US" sz="{size}" b="0" dirty="0"><a:solidFill><a:srgbClr val="{color}"/></a:solidFill><a:latin typeface="Calibri"/></a:rPr><a:t>{text}</a:t></a:r></a:p>"#,
            space = BULLET_SPACE_AFTER_CENTIPOINTS,
            size = BULLET_SIZE_CENTIPOINTS,
            color = BULLET_COLOR,
            text = xml_escape(bullet),
        ));
    }

    let shapes = format!(
        "{}{}",
        text_box(2, "Title", 457_200, 274_638, 8_229_600, 1_143_000, &heading_para),
        text_box(3, "Content", 457_200, 1_600_200, 8_229_600, 4_525_963, &bullet_paras),
    );
    slide_shell(CONTENT_BACKGROUND, &shapes)
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/></Relationships>"#;

const SLIDE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/></Relationships>"#;

const MASTER_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout" Target="../slideLayouts/slideLayout1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme" Target="../theme/theme1.xml"/></Relationships>"#;

const LAYOUT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="../slideMasters/slideMaster1.xml"/></Relationships>"#;

const SLIDE_MASTER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldMaster xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#;

const SLIDE_LAYOUT: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sldLayout xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" type="blank"><p:cSld name="Blank"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#;

const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme"><a:themeElements><a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1><a:dk2><a:srgbClr val="44546A"/></a:dk2><a:lt2><a:srgbClr val="E7E6E6"/></a:lt2><a:accent1><a:srgbClr val="4472C4"/></a:accent1><a:accent2><a:srgbClr val="ED7D31"/></a:accent2><a:accent3><a:srgbClr val="A5A5A5"/></a:accent3><a:accent4><a:srgbClr val="FFC000"/></a:accent4><a:accent5><a:srgbClr val="5B9BD5"/></a:accent5><a:accent6><a:srgbClr val="70AD47"/></a:accent6><a:hlink><a:srgbClr val="0563C1"/></a:hlink><a:folHlink><a:srgbClr val="954F72"/></a:folHlink></a:clrScheme><a:fontScheme name="Office"><a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont><a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme><a:fmtScheme name="Office"><a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:fillStyleLst><a:lnStyleLst><a:ln w="6350"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="12700"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln><a:ln w="19050"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst><a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst><a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::schema::{Slide, SlideDeck};
    use std::io::Read;

    fn sample_deck() -> SlideDeck {
        SlideDeck {
            title: "Cats & Dogs".to_string(),
            slides: vec![
                Slide {
                    title: "History".to_string(),
                    bullets: vec!["Domestication".to_string(), "Egypt <3".to_string()],
                },
                Slide {
                    title: "Today".to_string(),
                    bullets: vec!["Internet fame".to_string()],
                },
            ],
        }
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a & <b>"), "a &amp; &lt;b&gt;");
        assert_eq!(xml_escape("\"quoted\""), "&quot;quoted&quot;");
        assert_eq!(xml_escape("plain"), "plain");
    }

    #[test]
    fn test_pptx_is_a_zip_with_expected_parts() {
        let bytes = build_pptx(&sample_deck()).unwrap();
        assert_eq!(&bytes[..2], b"PK");

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
            // Title + two content slides + closing.
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/slide3.xml",
            "ppt/slides/slide4.xml",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing part: {}", part);
        }
        assert!(archive.by_name("ppt/slides/slide5.xml").is_err());
    }

    #[test]
    fn test_slide_text_is_escaped() {
        let bytes = build_pptx(&sample_deck()).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        let mut slide1 = String::new();
        archive
            .by_name("ppt/slides/slide1.xml")
            .unwrap()
            .read_to_string(&mut slide1)
            .unwrap();
        assert!(slide1.contains("Cats &amp; Dogs"));
        assert!(slide1.contains("Research Assistant"));

        let mut slide2 = String::new();
        archive
            .by_name("ppt/slides/slide2.xml")
            .unwrap()
            .read_to_string(&mut slide2)
            .unwrap();
        assert!(slide2.contains("Egypt &lt;3"));
        assert!(slide2.contains(r#"sz="1800""#));
        assert!(slide2.contains("Calibri"));
    }

    #[test]
    fn test_closing_slide_says_thank_you() {
        let bytes = build_pptx(&sample_deck()).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();

        let mut closing = String::new();
        archive
            .by_name("ppt/slides/slide4.xml")
            .unwrap()
            .read_to_string(&mut closing)
            .unwrap();
        assert!(closing.contains("Thank You!"));
        assert!(closing.contains(TITLE_BACKGROUND));
    }
}
