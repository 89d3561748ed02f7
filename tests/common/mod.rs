//! Shared fixtures: synthetic PDFs and rule-based classifiers.

#![allow(dead_code)]

use std::sync::Arc;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use pdf_outline::error::Result;
use pdf_outline::{
    BlockClassifier, Classifier, FeatureVector, LabelVocabulary, LevelClassifier, Models,
};

/// One line of text placed on a page.
#[derive(Debug, Clone, Copy)]
pub struct Run {
    pub text: &'static str,
    pub size: i64,
    pub bold: bool,
    pub x: i64,
    pub y: i64,
}

/// Regular text at baseline `y`.
pub fn text(text: &'static str, size: i64, y: i64) -> Run {
    Run {
        text,
        size,
        bold: false,
        x: 72,
        y,
    }
}

/// Bold text at baseline `y`.
pub fn bold(text: &'static str, size: i64, y: i64) -> Run {
    Run {
        bold: true,
        ..self::text(text, size, y)
    }
}

/// Build a letter-size PDF with one page per entry of `pages`.
///
/// `F1` is Helvetica and `F2` is Helvetica-Bold.
pub fn build_pdf(pages: &[Vec<Run>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for runs in pages {
        let mut operations = Vec::new();
        for run in runs {
            let font = if run.bold { "F2" } else { "F1" };
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec![font.into(), run.size.into()]));
            operations.push(Operation::new("Td", vec![run.x.into(), run.y.into()]));
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(run.text)],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("save pdf");
    buffer
}

/// Numeric operands, e.g. for `cm`, `Tm` and `Td`.
pub fn nums(values: &[f32]) -> Vec<Object> {
    values.iter().map(|&v| Object::Real(v)).collect()
}

/// `BT /font size Tf <a b c d e f> Tm (text) Tj ET`.
pub fn show_at(font: &str, size: i64, tm: [f32; 6], text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("Tm", nums(&tm)),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

/// A Form XObject registered on the page as `/name`.
pub struct Form {
    pub name: &'static str,
    /// `/Matrix` entry, identity when absent
    pub matrix: Option<[f32; 6]>,
    /// Give the form its own `/Resources` with Helvetica-Bold as `FX`.
    /// Without them the form draws with the page fonts.
    pub own_fonts: bool,
    pub operations: Vec<Operation>,
}

/// Build a one-page letter-size PDF from raw content operations.
///
/// The page sees `F1` (Helvetica), `F2` (Helvetica-Bold), every form in
/// `forms` and an image XObject `Im1`.
pub fn build_page(operations: Vec<Operation>, forms: Vec<Form>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });

    let mut xobjects = dictionary! {};
    let image = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1,
            "Height" => 1,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![0u8],
    ));
    xobjects.set("Im1", image);

    for form in forms {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => nums(&[0.0, 0.0, 612.0, 792.0]),
        };
        if let Some(matrix) = form.matrix {
            dict.set("Matrix", nums(&matrix));
        }
        if form.own_fonts {
            dict.set(
                "Resources",
                dictionary! {
                    "Font" => dictionary! { "FX" => bold },
                },
            );
        }
        let content = Content {
            operations: form.operations,
        };
        let id = doc.add_object(Stream::new(dict, content.encode().expect("encode form")));
        xobjects.set(form.name, id);
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("encode content"),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => dictionary! {
                "F1" => regular,
                "F2" => bold,
            },
            "XObject" => xobjects,
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::from(page_id)],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("save pdf");
    buffer
}

/// Title for size >= 20, heading for bold text, other otherwise.
pub struct RuleBlock;

impl Classifier for RuleBlock {
    fn classify(&self, features: &[FeatureVector]) -> Result<Vec<Vec<f32>>> {
        Ok(features
            .iter()
            .map(|f| {
                if f.avg_size >= 20.0 {
                    vec![0.8, 0.1, 0.1]
                } else if f.is_bold {
                    vec![0.1, 0.8, 0.1]
                } else {
                    vec![0.1, 0.1, 0.8]
                }
            })
            .collect())
    }
}

/// Heading for bold text, other otherwise. Never predicts a title.
pub struct NoTitleBlock;

impl Classifier for NoTitleBlock {
    fn classify(&self, features: &[FeatureVector]) -> Result<Vec<Vec<f32>>> {
        Ok(features
            .iter()
            .map(|f| {
                if f.is_bold {
                    vec![0.0, 0.9, 0.1]
                } else {
                    vec![0.0, 0.1, 0.9]
                }
            })
            .collect())
    }
}

/// H1 for size >= 16, H2 for >= 13, H3 otherwise.
pub struct RuleLevel;

impl Classifier for RuleLevel {
    fn classify(&self, features: &[FeatureVector]) -> Result<Vec<Vec<f32>>> {
        Ok(features
            .iter()
            .map(|f| {
                if f.avg_size >= 16.0 {
                    vec![0.7, 0.2, 0.1]
                } else if f.avg_size >= 13.0 {
                    vec![0.2, 0.7, 0.1]
                } else {
                    vec![0.1, 0.2, 0.7]
                }
            })
            .collect())
    }
}

/// Returns one distribution too few.
pub struct ShortBlock;

impl Classifier for ShortBlock {
    fn classify(&self, features: &[FeatureVector]) -> Result<Vec<Vec<f32>>> {
        Ok(features
            .iter()
            .skip(1)
            .map(|_| vec![0.0, 0.0, 1.0])
            .collect())
    }
}

pub fn models_with(block: impl Classifier + 'static) -> Models {
    Models::new(
        BlockClassifier::new(Arc::new(block), LabelVocabulary::block_default()),
        LevelClassifier::new(Arc::new(RuleLevel), LabelVocabulary::level_default()),
    )
}

pub fn rule_models() -> Models {
    models_with(RuleBlock)
}
