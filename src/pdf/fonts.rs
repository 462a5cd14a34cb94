use std::collections::BTreeMap;

use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use ttf_parser::{name_id, Face, GlyphId};

use super::PdfError;

/// A font the layout engine can measure text with and encode text for.
///
/// Advances are in thousandths of the font size.
pub(super) trait TextFont {
    fn advance(&self, ch: char) -> f32;

    fn measure(&self, text: &str) -> f32 {
        text.chars().map(|ch| self.advance(ch)).sum()
    }

    /// Encodes one line as a PDF string operand, recording glyph usage.
    fn encode(&mut self, line: &str) -> Object;

    /// Adds the font objects to `doc` and returns the font dictionary id.
    fn install(&self, doc: &mut Document) -> Result<ObjectId, PdfError>;
}

/// Widths of the printable ASCII range (32..=126) in standard Helvetica.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Built-in Latin font; the caller feeds it ASCII only.
pub(super) struct Helvetica;

impl TextFont for Helvetica {
    fn advance(&self, ch: char) -> f32 {
        match ch as u32 {
            code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize] as f32,
            _ => 556.0,
        }
    }

    fn encode(&mut self, line: &str) -> Object {
        let bytes = line.chars().filter(char::is_ascii).map(|ch| ch as u8).collect();
        Object::String(bytes, StringFormat::Hexadecimal)
    }

    fn install(&self, doc: &mut Document) -> Result<ObjectId, PdfError> {
        Ok(doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        }))
    }
}

/// TrueType font embedded as a CID font with Identity-H encoding, so any
/// character the font has a glyph for survives.
pub(super) struct UnicodeFont<'a> {
    face: Face<'a>,
    data: &'a [u8],
    name: String,
    used: BTreeMap<u16, (char, f32)>,
}

impl<'a> UnicodeFont<'a> {
    pub(super) fn parse(data: &'a [u8]) -> Result<Self, PdfError> {
        let face = Face::parse(data, 0)?;
        let name = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == name_id::POST_SCRIPT_NAME)
            .find_map(|name| name.to_string())
            .map(|name| name.chars().filter(|c| c.is_ascii_alphanumeric() || *c == '-').collect::<String>())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "EmbeddedFont".to_string());
        Ok(Self {
            face,
            data,
            name,
            used: BTreeMap::new(),
        })
    }

    fn scale(&self, units: f32) -> f32 {
        units * 1000.0 / self.face.units_per_em() as f32
    }

    fn glyph(&self, ch: char) -> GlyphId {
        self.face.glyph_index(ch).unwrap_or(GlyphId(0))
    }

    fn glyph_advance(&self, glyph: GlyphId) -> f32 {
        self.scale(self.face.glyph_hor_advance(glyph).unwrap_or(0) as f32)
    }

    fn to_unicode_cmap(&self) -> Vec<u8> {
        let mut cmap = String::from(
            "/CIDInit /ProcSet findresource begin\n12 dict begin\nbegincmap\n\
             /CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
             /CMapName /Adobe-Identity-UCS def\n/CMapType 2 def\n\
             1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n",
        );
        let entries: Vec<_> = self.used.iter().collect();
        for chunk in entries.chunks(100) {
            cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (glyph, (ch, _)) in chunk {
                let unicode: String = ch
                    .encode_utf16(&mut [0; 2])
                    .iter()
                    .map(|unit| format!("{unit:04X}"))
                    .collect();
                cmap.push_str(&format!("<{glyph:04X}> <{unicode}>\n"));
            }
            cmap.push_str("endbfchar\n");
        }
        cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend\n");
        cmap.into_bytes()
    }
}

impl TextFont for UnicodeFont<'_> {
    fn advance(&self, ch: char) -> f32 {
        self.glyph_advance(self.glyph(ch))
    }

    fn encode(&mut self, line: &str) -> Object {
        let mut bytes = Vec::with_capacity(line.len() * 2);
        for ch in line.chars() {
            let glyph = self.glyph(ch);
            // .notdef stands in for every missing character, so it gets no
            // ToUnicode or W entry; DW carries its width
            if glyph.0 != 0 {
                let width = self.glyph_advance(glyph);
                self.used.entry(glyph.0).or_insert((ch, width));
            }
            bytes.extend_from_slice(&glyph.0.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }

    fn install(&self, doc: &mut Document) -> Result<ObjectId, PdfError> {
        let bbox = self.face.global_bounding_box();
        let ascent = self.scale(self.face.ascender() as f32);
        let descent = self.scale(self.face.descender() as f32);
        let cap_height = self
            .face
            .capital_height()
            .map(|height| self.scale(height as f32))
            .unwrap_or(ascent);

        let font_file = doc.add_object(Stream::new(
            dictionary! { "Length1" => self.data.len() as i64 },
            self.data.to_vec(),
        ));
        let descriptor = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => self.name.as_str(),
            "Flags" => 32,
            "FontBBox" => vec![
                self.scale(bbox.x_min as f32).into(),
                self.scale(bbox.y_min as f32).into(),
                self.scale(bbox.x_max as f32).into(),
                self.scale(bbox.y_max as f32).into(),
            ],
            "ItalicAngle" => 0,
            "Ascent" => ascent,
            "Descent" => descent,
            "CapHeight" => cap_height,
            "StemV" => 80,
            "FontFile2" => font_file,
        });

        let widths: Vec<Object> = self
            .used
            .iter()
            .flat_map(|(glyph, (_, width))| {
                [Object::Integer(*glyph as i64), Object::Array(vec![(*width).into()])]
            })
            .collect();
        let cid_font = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "BaseFont" => self.name.as_str(),
            "CIDSystemInfo" => dictionary! {
                "Registry" => Object::string_literal("Adobe"),
                "Ordering" => Object::string_literal("Identity"),
                "Supplement" => 0,
            },
            "FontDescriptor" => descriptor,
            "DW" => self.glyph_advance(GlyphId(0)),
            "W" => widths,
            "CIDToGIDMap" => "Identity",
        });

        let to_unicode = doc.add_object(Stream::new(dictionary! {}, self.to_unicode_cmap()));
        Ok(doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => self.name.as_str(),
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(cid_font)],
            "ToUnicode" => to_unicode,
        }))
    }
}

/// A system copy of DejaVu Sans, if one is installed.
#[cfg(test)]
pub(super) fn system_test_font() -> Option<&'static std::path::Path> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "DejaVuSans.ttf",
    ]
    .into_iter()
    .map(std::path::Path::new)
    .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helvetica_widths_cover_printable_ascii() {
        let font = Helvetica;
        assert_eq!(font.advance(' '), 278.0);
        assert_eq!(font.advance('A'), 667.0);
        assert_eq!(font.advance('m'), 833.0);
        assert_eq!(font.advance('~'), 584.0);
        assert_eq!(font.measure("ab"), 1112.0);
    }

    #[test]
    fn helvetica_encodes_ascii_bytes() {
        let mut font = Helvetica;
        let Object::String(bytes, format) = font.encode("a(b)") else {
            panic!("expected a string operand");
        };
        assert_eq!(bytes, b"a(b)");
        assert!(matches!(format, StringFormat::Hexadecimal));
    }

    #[test]
    fn missing_glyphs_stay_out_of_the_unicode_map() {
        let Some(path) = system_test_font() else {
            return;
        };
        let data = std::fs::read(path).unwrap();
        let mut font = UnicodeFont::parse(&data).unwrap();
        let Object::String(bytes, _) = font.encode("a量子") else {
            panic!("expected a string operand");
        };
        assert_eq!(bytes.len(), 6);
        assert_eq!(&bytes[2..], &[0, 0, 0, 0]);
        assert_eq!(font.used.len(), 1);
        assert!(!font.used.contains_key(&0));

        let cmap = String::from_utf8(font.to_unicode_cmap()).unwrap();
        assert!(cmap.contains("1 beginbfchar\n"));
        assert!(cmap.contains("> <0061>\n"));
        assert!(!cmap.contains("<0000> <91CF>"));
    }

    #[test]
    fn garbage_is_not_a_font() {
        assert!(matches!(
            UnicodeFont::parse(b"definitely not a font"),
            Err(PdfError::Font(_))
        ));
    }
}
