/// One raw line from a tab-separated localization table.
///
/// Field layout per the game's format: field[0] is the key/context identifier
/// (Chinese original), field[3] is the translatable English payload. Lines
/// with fewer than 4 fields, or a blank field[3], are carried through the
/// pipeline untouched.
#[derive(Clone, Debug)]
pub struct LineRecord {
    pub index: usize,
    raw: String,
    fields: Vec<String>,
}

impl LineRecord {
    pub fn parse(index: usize, raw: &str) -> Self {
        let clean = raw.trim_end_matches(['\r', '\n']);
        let fields = clean.split('\t').map(|f| f.to_string()).collect();
        Self {
            index,
            raw: raw.to_string(),
            fields,
        }
    }

    /// Original line, terminator included.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn is_translatable(&self) -> bool {
        self.fields.len() >= 4 && !self.fields[3].trim().is_empty()
    }

    /// Disambiguating context: field[0], trimmed. Empty when the line has no
    /// usable key.
    #[must_use]
    pub fn context(&self) -> &str {
        self.fields.first().map(|f| f.trim()).unwrap_or("")
    }

    /// Translatable payload, verbatim. Leading/trailing padding is part of the
    /// string and must survive translation. Only meaningful when
    /// `is_translatable()`.
    #[must_use]
    pub fn text(&self) -> &str {
        self.fields.get(3).map(String::as_str).unwrap_or("")
    }

    /// Re-serialize the line with field[3] replaced by `translation`.
    #[must_use]
    pub fn with_translation(&self, translation: &str) -> String {
        let mut fields = self.fields.clone();
        fields[3] = translation.to_string();
        let mut out = fields.join("\t");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translatable_line() {
        let rec = LineRecord::parse(0, "苹果 \tctx1\tctx2\tApple\r\n");
        assert!(rec.is_translatable());
        assert_eq!(rec.context(), "苹果");
        assert_eq!(rec.text(), "Apple");
    }

    #[test]
    fn too_few_fields_is_pass_through() {
        let rec = LineRecord::parse(0, "a\tb\tc\n");
        assert!(!rec.is_translatable());
        assert_eq!(rec.raw(), "a\tb\tc\n");
    }

    #[test]
    fn blank_payload_is_pass_through() {
        let rec = LineRecord::parse(0, "a\tb\tc\t   \n");
        assert!(!rec.is_translatable());
    }

    #[test]
    fn payload_padding_is_verbatim() {
        let rec = LineRecord::parse(0, "k\tb\tc\t  Power  \n");
        assert!(rec.is_translatable());
        assert_eq!(rec.text(), "  Power  ");
    }

    #[test]
    fn serialization_replaces_fourth_field() {
        let rec = LineRecord::parse(7, "苹果\tctx1\tctx2\tApple\textra\r\n");
        assert_eq!(rec.with_translation("Mela"), "苹果\tctx1\tctx2\tMela\textra\n");
    }
}
