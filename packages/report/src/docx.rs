//! Minimal WordprocessingML (`.docx`) writer.
//!
//! A `.docx` file is a zip of XML parts. Only the parts Word needs to open
//! the document are written: content types, relationships, the main
//! document, styles, core properties and embedded media.

use std::fmt::Write as _;
use std::io::{Cursor, Write};
use std::path::Path;

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::Result;
use crate::model::{Block, ImageData, Report};

/// Embedded images are scaled to this width: 6 inches in EMU.
const IMAGE_WIDTH_EMU: u64 = 6 * 914_400;
/// Width of each info-table column: 1.5 inches in twips.
const INFO_CELL_TWIPS: u32 = 2160;
/// Page margins: 0.5 inch in twips.
const MARGIN_TWIPS: u32 = 720;
/// Content width of a Letter page with the margins above.
const CONTENT_TWIPS: u32 = 12240 - 2 * MARGIN_TWIPS;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Serialize `report` and write it to `path`.
pub fn write_docx(report: &Report, path: &Path) -> Result<()> {
    let bytes = to_bytes(report)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Serialize `report` into an in-memory `.docx` archive.
pub fn to_bytes(report: &Report) -> Result<Vec<u8>> {
    let mut body = Body::default();
    body.title(&report.title);
    for section in &report.sections {
        for block in &section.blocks {
            body.block(block);
        }
    }
    body.heading(2, "Submitted By:-");
    body.info_table(&report.info);

    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let parts = [
        ("[Content_Types].xml", content_types()),
        ("_rels/.rels", package_rels()),
        ("word/document.xml", body.document()),
        ("word/styles.xml", styles()),
        ("word/_rels/document.xml.rels", body.document_rels()),
        ("docProps/core.xml", core_properties(report)),
    ];
    for (name, xml) in parts {
        zip.start_file(name, options)?;
        zip.write_all(xml.as_bytes())?;
    }
    for (index, image) in body.media.iter().enumerate() {
        zip.start_file(format!("word/media/{}", media_name(index)), options)?;
        zip.write_all(&image.png)?;
    }

    Ok(zip.finish()?.into_inner())
}

#[derive(Default)]
struct Body<'a> {
    xml: String,
    media: Vec<&'a ImageData>,
}

impl<'a> Body<'a> {
    fn title(&mut self, text: &str) {
        self.xml.push_str(r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/><w:jc w:val="center"/></w:pPr>"#);
        self.run(r#"<w:b/><w:sz w:val="56"/><w:szCs w:val="56"/>"#, text);
        self.xml.push_str("</w:p>");
    }

    fn heading(&mut self, level: u8, text: &str) {
        let level = level.clamp(1, 3);
        let _ = write!(self.xml, r#"<w:p><w:pPr><w:pStyle w:val="Heading{level}"/></w:pPr>"#);
        self.run("", text);
        self.xml.push_str("</w:p>");
    }

    fn block(&mut self, block: &'a Block) {
        match block {
            Block::Heading { level, text } => self.heading(*level, text),
            Block::Paragraph(text) => self.paragraph("", text),
            Block::Placeholder(text) => self.paragraph("<w:i/>", text),
            Block::Code(text) => self.code(text),
            Block::Image(image) => self.image(image),
            Block::PageBreak => self.xml.push_str(r#"<w:p><w:r><w:br w:type="page"/></w:r></w:p>"#),
        }
    }

    fn paragraph(&mut self, run_props: &str, text: &str) {
        self.xml.push_str("<w:p>");
        self.run(run_props, text);
        self.xml.push_str("</w:p>");
    }

    /// One run; newlines become breaks and tabs become tab stops.
    fn run(&mut self, run_props: &str, text: &str) {
        self.xml.push_str("<w:r>");
        if !run_props.is_empty() {
            let _ = write!(self.xml, "<w:rPr>{run_props}</w:rPr>");
        }
        let text = text.strip_suffix('\n').unwrap_or(text);
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.xml.push_str("<w:br/>");
            }
            for (j, piece) in line.trim_end_matches('\r').split('\t').enumerate() {
                if j > 0 {
                    self.xml.push_str("<w:tab/>");
                }
                if !piece.is_empty() {
                    let _ = write!(self.xml, r#"<w:t xml:space="preserve">{}</w:t>"#, escape(piece));
                }
            }
        }
        self.xml.push_str("</w:r>");
    }

    fn code(&mut self, text: &str) {
        let _ = write!(
            self.xml,
            r#"<w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="{CONTENT_TWIPS}" w:type="dxa"/></w:tblPr><w:tblGrid><w:gridCol w:w="{CONTENT_TWIPS}"/></w:tblGrid><w:tr><w:tc><w:tcPr><w:tcW w:w="{CONTENT_TWIPS}" w:type="dxa"/><w:shd w:val="clear" w:color="auto" w:fill="D9D9D9"/></w:tcPr><w:p><w:pPr><w:spacing w:after="0"/></w:pPr>"#
        );
        self.run(
            r#"<w:rFonts w:ascii="Courier New" w:hAnsi="Courier New" w:cs="Courier New"/><w:sz w:val="21"/><w:szCs w:val="21"/>"#,
            text,
        );
        self.xml.push_str("</w:p></w:tc></w:tr></w:tbl>");
    }

    fn image(&mut self, image: &'a ImageData) {
        let index = self.media.len();
        self.media.push(image);
        let id = index + 1;
        let cx = IMAGE_WIDTH_EMU;
        let cy = cx * u64::from(image.height) / u64::from(image.width.max(1));
        let name = escape(&image.file_name);
        let _ = write!(
            self.xml,
            concat!(
                r#"<w:p><w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0">"#,
                r#"<wp:extent cx="{cx}" cy="{cy}"/><wp:docPr id="{id}" name="Picture {id}"/>"#,
                r#"<wp:cNvGraphicFramePr><a:graphicFrameLocks noChangeAspect="1"/></wp:cNvGraphicFramePr>"#,
                r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
                r#"<pic:pic><pic:nvPicPr><pic:cNvPr id="{id}" name="{name}"/><pic:cNvPicPr/></pic:nvPicPr>"#,
                r#"<pic:blipFill><a:blip r:embed="{rel}"/><a:stretch><a:fillRect/></a:stretch></pic:blipFill>"#,
                r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm>"#,
                r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></pic:spPr></pic:pic>"#,
                r#"</a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
            ),
            cx = cx,
            cy = cy,
            id = id,
            name = name,
            rel = media_rel(index),
        );
    }

    fn info_table(&mut self, rows: &[(String, String)]) {
        let _ = write!(
            self.xml,
            r#"<w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="{w}" w:type="dxa"/><w:jc w:val="left"/><w:tblLayout w:type="fixed"/></w:tblPr><w:tblGrid><w:gridCol w:w="{c}"/><w:gridCol w:w="{c}"/></w:tblGrid>"#,
            w = 2 * INFO_CELL_TWIPS,
            c = INFO_CELL_TWIPS,
        );
        for (label, value) in rows {
            self.xml.push_str("<w:tr>");
            for text in [label, value] {
                let _ = write!(
                    self.xml,
                    r#"<w:tc><w:tcPr><w:tcW w:w="{INFO_CELL_TWIPS}" w:type="dxa"/></w:tcPr><w:p>"#
                );
                self.run("", text);
                self.xml.push_str("</w:p></w:tc>");
            }
            self.xml.push_str("</w:tr>");
        }
        // Word expects a paragraph between a trailing table and the section properties.
        self.xml.push_str("</w:tbl><w:p/>");
    }

    fn document(&self) -> String {
        format!(
            concat!(
                "{decl}",
                r#"<w:document xmlns:w="{w}" xmlns:r="{r}" "#,
                r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
                r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
                r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
                "<w:body>{body}",
                r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/>"#,
                r#"<w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="720" w:footer="720" w:gutter="0"/>"#,
                "</w:sectPr></w:body></w:document>",
            ),
            decl = XML_DECL,
            w = NS_MAIN,
            r = NS_REL,
            body = self.xml,
            m = MARGIN_TWIPS,
        )
    }

    fn document_rels(&self) -> String {
        let mut xml = format!(
            r#"{XML_DECL}<Relationships xmlns="{NS_PKG_REL}"><Relationship Id="rIdStyles" Type="{NS_REL}/styles" Target="styles.xml"/>"#
        );
        for index in 0..self.media.len() {
            let _ = write!(
                xml,
                r#"<Relationship Id="{}" Type="{NS_REL}/image" Target="media/{}"/>"#,
                media_rel(index),
                media_name(index)
            );
        }
        xml.push_str("</Relationships>");
        xml
    }
}

fn media_rel(index: usize) -> String {
    format!("rIdImage{}", index + 1)
}

fn media_name(index: usize) -> String {
    format!("image{}.png", index + 1)
}

fn content_types() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Default Extension="png" ContentType="image/png"/>"#,
            r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
            r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
            r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
            "</Types>",
        ),
        decl = XML_DECL,
    )
}

fn package_rels() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<Relationships xmlns="{pkg}">"#,
            r#"<Relationship Id="rId1" Type="{rel}/officeDocument" Target="word/document.xml"/>"#,
            r#"<Relationship Id="rId2" Type="{pkg}/metadata/core-properties" Target="docProps/core.xml"/>"#,
            "</Relationships>",
        ),
        decl = XML_DECL,
        pkg = NS_PKG_REL,
        rel = NS_REL,
    )
}

fn styles() -> String {
    let mut xml = format!(
        concat!(
            "{decl}",
            r#"<w:styles xmlns:w="{w}">"#,
            r#"<w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Calibri" w:hAnsi="Calibri" w:cs="Calibri"/>"#,
            r#"<w:sz w:val="22"/><w:szCs w:val="22"/></w:rPr></w:rPrDefault>"#,
            r#"<w:pPrDefault><w:pPr><w:spacing w:after="160" w:line="259" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults>"#,
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
        ),
        decl = XML_DECL,
        w = NS_MAIN,
    );
    for (level, size) in [(1, 32), (2, 26), (3, 24)] {
        let _ = write!(
            xml,
            concat!(
                r#"<w:style w:type="paragraph" w:styleId="Heading{level}"><w:name w:val="heading {level}"/>"#,
                r#"<w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
                r#"<w:pPr><w:keepNext/><w:spacing w:before="240" w:after="80"/><w:outlineLvl w:val="{outline}"/></w:pPr>"#,
                r#"<w:rPr><w:b/><w:color w:val="2F5496"/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr></w:style>"#,
            ),
            level = level,
            outline = level - 1,
            size = size,
        );
    }
    xml.push_str(concat!(
        r#"<w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/>"#,
        r#"<w:tblPr><w:tblBorders>"#,
        r#"<w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"<w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"<w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"<w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"<w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"<w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/>"#,
        r#"</w:tblBorders><w:tblCellMar><w:left w:w="108" w:type="dxa"/><w:right w:w="108" w:type="dxa"/></w:tblCellMar></w:tblPr>"#,
        r#"</w:style></w:styles>"#,
    ));
    xml
}

fn core_properties(report: &Report) -> String {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    format!(
        concat!(
            "{decl}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
            r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
            r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
            "<dc:title>{title}</dc:title><dc:creator>{author}</dc:creator>",
            r#"<dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created>"#,
            r#"<dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified>"#,
            "</cp:coreProperties>",
        ),
        decl = XML_DECL,
        title = escape(&report.title),
        author = escape(&report.author),
        now = now,
    )
}

/// Escape markup characters and drop characters XML 1.0 cannot carry.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c < ' ' || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}
