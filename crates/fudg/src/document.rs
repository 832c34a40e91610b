//! The single-document text format read by the command line tool.
//!
//! The first line holds the sentence tokens separated by whitespace; the
//! rest of the text is the GFL annotation.

/// A sentence and its annotation, borrowed from the document text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<'a> {
    words: Vec<&'a str>,
    annotation: &'a str,
    annotation_offset: usize,
}

impl<'a> Document<'a> {
    /// Split `text` into its sentence line and annotation.
    ///
    /// A text without a line break is a sentence with an empty annotation.
    ///
    /// # Example
    ///
    /// ```
    /// # use fudg::Document;
    /// let document = Document::parse("the cat sat\nsat > cat\n");
    /// assert_eq!(document.words(), &["the", "cat", "sat"]);
    /// assert_eq!(document.annotation(), "sat > cat\n");
    /// ```
    pub fn parse(text: &'a str) -> Self {
        let (sentence, annotation) = text.split_once('\n').unwrap_or((text, ""));
        Self {
            words: sentence.split_whitespace().collect(),
            annotation,
            annotation_offset: text.len() - annotation.len(),
        }
    }

    pub fn words(&self) -> &[&'a str] {
        &self.words
    }

    pub fn annotation(&self) -> &'a str {
        self.annotation
    }

    /// Byte position of the annotation in the document text.
    pub fn annotation_offset(&self) -> usize {
        self.annotation_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_only() {
        let document = Document::parse("a  b\tc");
        assert_eq!(document.words(), &["a", "b", "c"]);
        assert_eq!(document.annotation(), "");
    }

    #[test]
    fn test_crlf_sentence_line() {
        let document = Document::parse("a b\r\na > b");
        assert_eq!(document.words(), &["a", "b"]);
        assert_eq!(document.annotation(), "a > b");
        assert_eq!(document.annotation_offset(), 5);
    }

    #[test]
    fn test_empty_text() {
        let document = Document::parse("");
        assert!(document.words().is_empty());
        assert_eq!(document.annotation(), "");
        assert_eq!(document.annotation_offset(), 0);
    }
}
