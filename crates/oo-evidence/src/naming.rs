//! Evidence and visitor file naming
//!
//! Evidence file names look like
//! `03-Dina Putri-Jumat-20261016_093000-2-Approved.png`: daily sequence,
//! sanitized owner name, localized weekday, submission time, optional copy
//! number, optional batch index and optional stage suffix.

use chrono::{DateTime, Datelike, FixedOffset};
use oo_core::types::Locale;
use oo_core::Id;
use std::fmt;

/// Lifecycle marker appended to evidence file names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Approved,
    Rework,
    Reworked,
    Deleted,
    UpdatedChecking,
}

impl Stage {
    /// Longest first, so `Reworked` is stripped before `Rework`
    const ALL: [Stage; 5] = [
        Stage::UpdatedChecking,
        Stage::Reworked,
        Stage::Approved,
        Stage::Deleted,
        Stage::Rework,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            Stage::Approved => "Approved",
            Stage::Rework => "Rework",
            Stage::Reworked => "Reworked",
            Stage::Deleted => "Deleted",
            Stage::UpdatedChecking => "Updated-Checking",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Keeps ASCII letters, digits, spaces and hyphens; collapses whitespace
pub fn safe_name(name: &str) -> String {
    let filtered: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ' || *c == '-' || c.is_whitespace())
        .collect();
    let collapsed = filtered.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        "user".to_string()
    } else {
        collapsed
    }
}

/// Everything that goes into one evidence file name
#[derive(Debug, Clone)]
pub struct EvidenceName<'a> {
    pub sequence: i32,
    pub user_name: &'a str,
    pub at: DateTime<FixedOffset>,
    pub locale: Locale,
    /// Set when the plain name is already taken; rendered as `_{n}`
    pub copy: Option<u32>,
    /// 1-based position, only rendered for batches larger than one
    pub index: Option<usize>,
    pub stage: Option<Stage>,
    pub extension: &'a str,
}

impl EvidenceName<'_> {
    pub fn file_name(&self) -> String {
        let mut name = format!(
            "{:02}-{}-{}-{}",
            self.sequence.max(1),
            safe_name(self.user_name),
            self.locale.weekday_name(self.at.weekday()),
            self.at.format("%Y%m%d_%H%M%S"),
        );
        if let Some(copy) = self.copy {
            name.push_str(&format!("_{}", copy));
        }
        if let Some(index) = self.index {
            name.push_str(&format!("-{}", index));
        }
        if let Some(stage) = self.stage {
            name.push('-');
            name.push_str(stage.suffix());
        }
        if !self.extension.is_empty() {
            name.push('.');
            name.push_str(&self.extension.to_ascii_lowercase());
        }
        name
    }
}

/// `evidence/{YYYY}/{MM}/{DD}/user-{id}`
pub fn evidence_directory(user_id: Id, at: &DateTime<FixedOffset>) -> String {
    format!(
        "evidence/{}/{:02}/{:02}/user-{}",
        at.year(),
        at.month(),
        at.day(),
        user_id
    )
}

/// Splits `dir/name.ext` into (`dir/`, `name`, `.ext`)
fn split_path(path: &str) -> (&str, &str, &str) {
    let (dir, file) = match path.rfind('/') {
        Some(pos) => path.split_at(pos + 1),
        None => ("", path),
    };
    match file.rfind('.') {
        Some(pos) if pos > 0 => {
            let (stem, ext) = file.split_at(pos);
            (dir, stem, ext)
        }
        _ => (dir, file, ""),
    }
}

/// File name without directory or extension
pub fn file_stem(path: &str) -> &str {
    split_path(path).1
}

/// Path of the same file carrying `stage` instead of its current marker
pub fn restage(path: &str, stage: Stage) -> String {
    let (dir, stem, ext) = split_path(path);
    let base = Stage::ALL
        .iter()
        .find_map(|existing| stem.strip_suffix(&format!("-{}", existing.suffix())))
        .unwrap_or(stem);
    format!("{}{}-{}{}", dir, base, stage.suffix(), ext)
}

/// `visitors/{Y}/{m}/{d}/{safe_name}-01`
pub fn visitor_folder(visitor_name: &str, at: &DateTime<FixedOffset>) -> String {
    format!(
        "visitors/{}/{:02}/{:02}/{}-01",
        at.year(),
        at.month(),
        at.day(),
        safe_name(visitor_name)
    )
}

/// Kind of image captured at visitor registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitorImage {
    IdCard,
    Face,
}

impl VisitorImage {
    fn prefix(&self) -> &'static str {
        match self {
            VisitorImage::IdCard => "KTP",
            VisitorImage::Face => "FACE",
        }
    }

    pub fn subdirectory(&self) -> &'static str {
        match self {
            VisitorImage::IdCard => "ktp",
            VisitorImage::Face => "face",
        }
    }

    /// `{folder}/ktp/KTP-{YYYYmmdd_HHMMSS}-{safe_name}.{ext}`
    pub fn path(
        &self,
        folder: &str,
        visitor_name: &str,
        at: &DateTime<FixedOffset>,
        extension: &str,
    ) -> String {
        format!(
            "{}/{}/{}-{}-{}.{}",
            folder,
            self.subdirectory(),
            self.prefix(),
            at.format("%Y%m%d_%H%M%S"),
            safe_name(visitor_name),
            extension.to_ascii_lowercase()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jakarta_friday() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 16, 9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_safe_name_allow_list() {
        assert_eq!(safe_name("  Dina   Putri "), "Dina Putri");
        assert_eq!(safe_name("Ré/né: O'Neil-Smith"), "Rn ONeil-Smith");
        assert_eq!(safe_name("../../etc"), "etc");
        assert_eq!(safe_name("///"), "user");
        assert!(safe_name("a_b*c?d")
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-'));
    }

    #[test]
    fn test_single_file_name() {
        let name = EvidenceName {
            sequence: 3,
            user_name: "Dina Putri",
            at: jakarta_friday(),
            locale: Locale::Id,
            copy: None,
            index: None,
            stage: None,
            extension: "PNG",
        };
        assert_eq!(name.file_name(), "03-Dina Putri-Jumat-20261016_093000.png");

        let taken = EvidenceName {
            copy: Some(2),
            ..name
        };
        assert_eq!(taken.file_name(), "03-Dina Putri-Jumat-20261016_093000_2.png");
    }

    #[test]
    fn test_batch_file_name_with_stage() {
        let name = EvidenceName {
            sequence: 12,
            user_name: "Dina",
            at: jakarta_friday(),
            locale: Locale::En,
            copy: None,
            index: Some(2),
            stage: Some(Stage::UpdatedChecking),
            extension: "pdf",
        };
        assert_eq!(
            name.file_name(),
            "12-Dina-Friday-20261016_093000-2-Updated-Checking.pdf"
        );
    }

    #[test]
    fn test_evidence_directory() {
        assert_eq!(
            evidence_directory(7, &jakarta_friday()),
            "evidence/2026/10/16/user-7"
        );
    }

    #[test]
    fn test_restage_replaces_existing_marker() {
        let path = "evidence/2026/10/16/user-7/01-Dina-Jumat-20261016_093000-2.png";
        let rework = restage(path, Stage::Rework);
        assert_eq!(
            rework,
            "evidence/2026/10/16/user-7/01-Dina-Jumat-20261016_093000-2-Rework.png"
        );

        let approved = restage(&rework, Stage::Approved);
        assert_eq!(
            approved,
            "evidence/2026/10/16/user-7/01-Dina-Jumat-20261016_093000-2-Approved.png"
        );

        let deleted = restage(
            "e/01-Dina-Jumat-20261016_093000-Reworked.png",
            Stage::Deleted,
        );
        assert_eq!(deleted, "e/01-Dina-Jumat-20261016_093000-Deleted.png");

        let deleted = restage(
            "e/01-Dina-Jumat-20261016_093000-Updated-Checking.png",
            Stage::Deleted,
        );
        assert_eq!(deleted, "e/01-Dina-Jumat-20261016_093000-Deleted.png");
    }

    #[test]
    fn test_restage_preserves_sequence_prefix() {
        let path = "e/05-Dina-Jumat-20261016_093000.png";
        let staged = restage(path, Stage::Approved);
        assert!(file_stem(&staged).starts_with("05-"));
    }

    #[test]
    fn test_visitor_paths() {
        let at = jakarta_friday();
        let folder = visitor_folder("Budi Santoso", &at);
        assert_eq!(folder, "visitors/2026/10/16/Budi Santoso-01");
        assert_eq!(
            VisitorImage::IdCard.path(&folder, "Budi Santoso", &at, "JPG"),
            "visitors/2026/10/16/Budi Santoso-01/ktp/KTP-20261016_093000-Budi Santoso.jpg"
        );
        assert_eq!(
            VisitorImage::Face.path(&folder, "Budi Santoso", &at, "png"),
            "visitors/2026/10/16/Budi Santoso-01/face/FACE-20261016_093000-Budi Santoso.png"
        );
    }
}
