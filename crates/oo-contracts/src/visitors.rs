//! Visitor registration contract

use oo_core::error::ValidationErrors;

use crate::base::{Contract, ValidationResult};
use crate::files::{FileRules, UploadedFile};

/// Both images of a registration: the ID card scan and the face photo
pub struct VisitorImages<'a, F> {
    pub ktp_image: Option<&'a F>,
    pub face_image: Option<&'a F>,
}

#[derive(Debug, Clone)]
pub struct VisitorImagesContract {
    pub rules: FileRules,
}

impl VisitorImagesContract {
    pub fn new(rules: FileRules) -> Self {
        Self { rules }
    }
}

impl<'a, F: UploadedFile + Sync> Contract<VisitorImages<'a, F>> for VisitorImagesContract {
    fn validate(&self, images: &VisitorImages<'a, F>) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        for (field, image) in [("ktp_image", images.ktp_image), ("face_image", images.face_image)] {
            match image {
                Some(file) => self.rules.check(field, file, &mut errors),
                None => errors.add(field, "is required"),
            }
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::test_support::file;

    fn contract() -> VisitorImagesContract {
        let exts: Vec<String> = ["jpg", "jpeg", "png"].iter().map(|s| s.to_string()).collect();
        VisitorImagesContract::new(FileRules::new(5 * 1024 * 1024, &exts))
    }

    #[test]
    fn test_both_images_required() {
        let ktp = file("ktp.jpg", 10);
        let images = VisitorImages {
            ktp_image: Some(&ktp),
            face_image: None,
        };
        let errors = contract().validate(&images).unwrap_err();
        assert!(errors.has_error("face_image"));
        assert!(!errors.has_error("ktp_image"));
    }

    #[test]
    fn test_pdf_is_not_an_image() {
        let ktp = file("ktp.pdf", 10);
        let face = file("face.png", 10);
        let images = VisitorImages {
            ktp_image: Some(&ktp),
            face_image: Some(&face),
        };
        assert!(contract().validate(&images).is_err());
    }
}
