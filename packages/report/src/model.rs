//! In-memory document, independent of the file format it is written to.

/// Fallback aspect ratio when an image's dimensions cannot be read.
const DEFAULT_DIMENSIONS: (u32, u32) = (4, 3);

#[derive(Debug, Clone, Default)]
pub struct Report {
    pub title: String,
    pub author: String,
    pub sections: Vec<Section>,
    /// Rows of the closing "Submitted By" table.
    pub info: Vec<(String, String)>,
}

/// Everything produced for one source file.
#[derive(Debug, Clone)]
pub struct Section {
    pub file_name: String,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            blocks: Vec::new(),
        }
    }

    pub fn heading(&mut self, level: u8, text: impl Into<String>) {
        self.blocks.push(Block::Heading {
            level,
            text: text.into(),
        });
    }

    pub fn paragraph(&mut self, text: impl Into<String>) {
        self.blocks.push(Block::Paragraph(text.into()));
    }

    pub fn placeholder(&mut self, text: impl Into<String>) {
        self.blocks.push(Block::Placeholder(text.into()));
    }

    pub fn code(&mut self, text: impl Into<String>) {
        self.blocks.push(Block::Code(text.into()));
    }

    pub fn image(&mut self, image: ImageData) {
        self.blocks.push(Block::Image(image));
    }

    /// Headings in this section, in order.
    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Heading { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn has_heading(&self, text: &str) -> bool {
        self.headings().any(|h| h == text)
    }
}

#[derive(Debug, Clone)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    /// Monospaced, shaded listing.
    Code(String),
    Image(ImageData),
    /// Bracketed note standing in for missing content.
    Placeholder(String),
    PageBreak,
}

/// A PNG to embed, with its pixel size.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub file_name: String,
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl ImageData {
    pub fn new(file_name: impl Into<String>, png: Vec<u8>) -> Self {
        let (width, height) = png_dimensions(&png).unwrap_or(DEFAULT_DIMENSIONS);
        Self {
            file_name: file_name.into(),
            png,
            width,
            height,
        }
    }
}

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Width and height from the IHDR chunk, which must directly follow the signature.
pub fn png_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    if data.len() < 24 || data[..8] != PNG_SIGNATURE || &data[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(data[16..20].try_into().ok()?);
    let height = u32::from_be_bytes(data[20..24].try_into().ok()?);
    (width > 0 && height > 0).then_some((width, height))
}

#[cfg(test)]
pub(crate) fn tiny_png(width: u32, height: u32) -> Vec<u8> {
    let mut png = PNG_SIGNATURE.to_vec();
    png.extend_from_slice(&13u32.to_be_bytes());
    png.extend_from_slice(b"IHDR");
    png.extend_from_slice(&width.to_be_bytes());
    png.extend_from_slice(&height.to_be_bytes());
    png.extend_from_slice(&[8, 6, 0, 0, 0]);
    png.extend_from_slice(&[0, 0, 0, 0]);
    png
}
