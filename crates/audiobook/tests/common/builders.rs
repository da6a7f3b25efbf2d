//! Builders for test fixtures.

#![allow(dead_code)]

use std::path::Path;

use audiobook::Config;
use lopdf::{dictionary, Document, Object, Stream};

/// Builds in-memory PDFs, one page at a time.
#[derive(Default)]
pub struct PdfBuilder {
    pages: Vec<Option<String>>,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page showing `text` in a standard font.
    pub fn page(mut self, text: &str) -> Self {
        self.pages.push(Some(text.to_string()));
        self
    }

    /// Adds a page without a content stream, like a scan with no text layer.
    pub fn blank_page(mut self) -> Self {
        self.pages.push(None);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for page in &self.pages {
            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources_id,
            };
            if let Some(text) = page {
                let content = format!("BT\n/F1 14 Tf\n72 720 Td\n({}) Tj\nET\n", text);
                let content_id =
                    doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
                page_dict.set("Contents", content_id);
            }
            kids.push(Object::from(doc.add_object(page_dict)));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("Failed to serialize PDF");
        bytes
    }
}

/// Builder for `Config` values rooted in a test directory.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Uploads and audio go to `<base>/uploads` and `<base>/audio`.
    pub fn new(base: &Path) -> Self {
        Self {
            config: Config {
                upload_folder: base.join("uploads"),
                audio_folder: base.join("audio"),
                worker_count: 2,
                ..Config::default()
            },
        }
    }

    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    pub fn worker_count(mut self, count: usize) -> Self {
        self.config.worker_count = count;
        self
    }

    pub fn language(mut self, language: &str) -> Self {
        self.config.language = language.to_string();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
