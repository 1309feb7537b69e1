use crate::record::{MasterFile, Rotation};
use iiifman_extract::{Descriptive, PageRecord, sanitize};

/// How the exemplar (start) page is recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExemplarRule {
    /// The page whose filename equals the record's exemplar filename.
    Filename(String),
    /// The page the source flagged as exemplar.
    Flag,
    None,
}

impl ExemplarRule {
    /// Filename rule when the record names an exemplar, otherwise no rule.
    pub fn filename(exemplar: Option<&str>) -> Self {
        match exemplar.map(str::trim) {
            Some(filename) if !filename.is_empty() => Self::Filename(filename.to_string()),
            _ => Self::None,
        }
    }

    fn matches(&self, page: &PageRecord) -> bool {
        match self {
            Self::Filename(filename) => page.filename == *filename,
            Self::Flag => page.is_exemplar(),
            Self::None => false,
        }
    }
}

/// Canonical page list of a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageList {
    pub master_files: Vec<MasterFile>,
    /// Zero-based index of the exemplar page, or 0.
    pub start_page: usize,
    /// PID and rotation of the exemplar page.
    pub exemplar: Option<(String, Rotation)>,
}

/// Turn raw page records into master files, in source order.
///
/// Cloned pages take the identity of their source image, orientation is
/// normalised, and an attached MODS record overrides the page's title and
/// description. The first page matching `rule` becomes the exemplar; if none
/// does, the list starts at page 0 with no exemplar.
pub fn build(pages: Vec<PageRecord>, rule: &ExemplarRule) -> PageList {
    let mut list = PageList { master_files: Vec::with_capacity(pages.len()), ..PageList::default() };
    for (index, page) in pages.into_iter().enumerate() {
        let (pid, _) = page.image();
        if pid != page.pid {
            tracing::debug!(target: "iiifman::manifest", page = %page.pid, source = pid, "page is a clone");
        }
        let mut master_file = MasterFile {
            pid: sanitize(pid),
            title: sanitize(page.title.as_deref().unwrap_or_default()),
            description: sanitize(page.description.as_deref().unwrap_or_default()),
            width: page.width,
            height: page.height,
            rotation: Rotation::from_orientation(page.orientation.as_deref()),
            exemplar: false,
        };
        if let Some(mods) = page.descriptive.as_deref() {
            apply_descriptive(&mut master_file, mods);
        }
        if list.exemplar.is_none() && rule.matches(&page) {
            tracing::info!(
                target: "iiifman::manifest",
                pid = %master_file.pid,
                filename = %page.filename,
                page = index,
                "exemplar set"
            );
            master_file.exemplar = true;
            list.start_page = index;
            list.exemplar = Some((master_file.pid.clone(), master_file.rotation));
        }
        list.master_files.push(master_file);
    }
    list
}

fn apply_descriptive(master_file: &mut MasterFile, mods: &str) {
    match Descriptive::from_mods(mods) {
        Ok(descriptive) if descriptive.is_empty() => {
            tracing::debug!(target: "iiifman::manifest", pid = %master_file.pid, "MODS has no title or description");
        },
        Ok(descriptive) => {
            if let Some(title) = descriptive.title {
                master_file.title = sanitize(&title);
            }
            if let Some(description) = descriptive.description {
                master_file.description = sanitize(&description);
            }
        },
        Err(err) => {
            tracing::warn!(target: "iiifman::manifest", pid = %master_file.pid, error = %err, "ignoring unparseable MODS")
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iiifman_extract::CloneSource;

    fn page(pid: &str, filename: &str) -> PageRecord {
        PageRecord {
            pid: pid.to_string(),
            filename: filename.to_string(),
            title: Some(format!("Page {pid}")),
            width: 100,
            height: 200,
            ..PageRecord::default()
        }
    }

    #[test]
    fn test_preserves_source_order() {
        let pages = vec![page("p3", "c.tif"), page("p1", "a.tif"), page("p2", "b.tif")];
        let list = build(pages, &ExemplarRule::None);
        let pids: Vec<_> = list.master_files.iter().map(|mf| mf.pid.as_str()).collect();
        assert_eq!(pids, ["p3", "p1", "p2"]);
    }

    #[test]
    fn test_exemplar_by_filename() {
        let pages = vec![page("p1", "a.tif"), page("p2", "b.tif"), page("p3", "c.tif")];
        let list = build(pages, &ExemplarRule::filename(Some("b.tif")));
        assert_eq!(list.start_page, 1);
        assert_eq!(list.exemplar, Some(("p2".to_string(), Rotation::None)));
        assert_eq!(list.master_files.iter().filter(|mf| mf.exemplar).count(), 1);
        assert!(list.master_files[1].exemplar);
    }

    #[test]
    fn test_exemplar_by_flag_takes_first_match() {
        let mut pages = vec![page("p1", "a.tif"), page("p2", "b.tif"), page("p3", "c.tif")];
        pages[1].exemplar = Some(true);
        pages[1].orientation = Some("rotate270".to_string());
        pages[2].exemplar = Some(true);
        let list = build(pages, &ExemplarRule::Flag);
        assert_eq!(list.start_page, 1);
        assert_eq!(list.exemplar, Some(("p2".to_string(), Rotation::Clockwise270)));
        assert_eq!(list.master_files.iter().filter(|mf| mf.exemplar).count(), 1);
    }

    #[test]
    fn test_flag_is_ignored_under_filename_rule() {
        let mut pages = vec![page("p1", "a.tif"), page("p2", "b.tif")];
        pages[1].exemplar = Some(true);
        let list = build(pages, &ExemplarRule::filename(Some("missing.tif")));
        assert_eq!(list.start_page, 0);
        assert_eq!(list.exemplar, None);
        assert!(list.master_files.iter().all(|mf| !mf.exemplar));
    }

    #[test]
    fn test_blank_exemplar_filename_is_no_rule() {
        assert_eq!(ExemplarRule::filename(Some("  ")), ExemplarRule::None);
        assert_eq!(ExemplarRule::filename(None), ExemplarRule::None);
    }

    #[test]
    fn test_clone_resolves_to_source_pid() {
        let mut clone = page("P2", "b.tif");
        clone.cloned_from = Some(CloneSource { pid: "P1".to_string(), filename: "a.tif".to_string() });
        clone.exemplar = Some(true);
        let list = build(vec![clone], &ExemplarRule::Flag);
        assert_eq!(list.master_files[0].pid, "P1");
        assert_eq!(list.exemplar, Some(("P1".to_string(), Rotation::None)));
    }

    #[test]
    fn test_clone_with_empty_pid_keeps_own_identity() {
        let mut clone = page("P2", "b.tif");
        clone.cloned_from = Some(CloneSource::default());
        assert_eq!(build(vec![clone], &ExemplarRule::None).master_files[0].pid, "P2");
    }

    #[test]
    fn test_text_is_sanitized() {
        let mut raw = page("p1", "a.tif");
        raw.title = Some("Line one\nline \"two\"".to_string());
        raw.description = Some("tab\there\u{000C}".to_string());
        let list = build(vec![raw], &ExemplarRule::None);
        assert_eq!(list.master_files[0].title, r#"Line one line \"two\""#);
        assert_eq!(list.master_files[0].description, "tab here");
    }

    #[test]
    fn test_mods_without_title_or_description_keeps_page_text() {
        let mut raw = page("p1", "a.tif");
        raw.description = Some("original".to_string());
        raw.descriptive = Some(r#"<mods><note type="provenance">Public</note></mods>"#.to_string());
        let list = build(vec![raw], &ExemplarRule::None);
        assert_eq!(list.master_files[0].title, "Page p1");
        assert_eq!(list.master_files[0].description, "original");
    }

    #[test]
    fn test_mods_overrides_title_and_description() {
        let mut raw = page("p1", "a.tif");
        raw.description = Some("original".to_string());
        raw.descriptive = Some(
            r#"<mods xmlns="http://www.loc.gov/mods/v3">
                <titleInfo><title>From MODS</title></titleInfo>
                <note type="provenance" displayLabel="staff">Rebound 1990</note>
            </mods>"#
                .to_string(),
        );
        let list = build(vec![raw], &ExemplarRule::None);
        assert_eq!(list.master_files[0].title, "From MODS");
        assert_eq!(list.master_files[0].description, "Staff note: Rebound 1990");
    }

    #[test]
    fn test_broken_mods_is_ignored() {
        let mut raw = page("p1", "a.tif");
        raw.descriptive = Some("<mods><titleInfo>".to_string());
        let list = build(vec![raw], &ExemplarRule::None);
        assert_eq!(list.master_files[0].title, "Page p1");
    }

    #[test]
    fn test_empty_page_list() {
        let list = build(Vec::new(), &ExemplarRule::Flag);
        assert!(list.master_files.is_empty());
        assert_eq!(list.start_page, 0);
        assert_eq!(list.exemplar, None);
    }
}
