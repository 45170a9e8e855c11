//! Page-model extraction for the statement portal's rendered views.
//!
//! The portal is a server-rendered JSF application: every view is the same
//! listing URL with different hidden-form state, and "links" are anchors
//! whose element ids double as form selector keys. The extractors below are
//! pure functions over raw HTML: they parse internally and return owned
//! data, so the non-`Send` DOM is never held across an await point.

use chrono::NaiveDate;
use scraper::{Html, Selector};

use crate::error::AppError;
use crate::form::FormSnapshot;

/// Element id of the statement navigation form.
pub const STATEMENT_FORM_ID: &str = "statement";
/// Element id of the container holding the selectable year links.
pub const YEAR_LINKS_ID: &str = "statement:yearLinks";
/// Element id of the table listing one statement per row.
pub const CHECKS_TABLE_ID: &str = "statement:checks";
/// Synthetic mode field echoed with every submission.
pub const MODE_FIELD: &str = "statement:changeStatementsType";
/// Mode value selecting pay statements. `2` selects W-2 mode.
pub const MODE_PAY_STATEMENTS: &str = "1";
/// Marker field whose presence resets the view back to the year list.
pub const DONE_FIELD: &str = "statement:done";

/// A selectable year link: display label plus its opaque selector id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearEntry {
    pub label: String,
    pub selector_id: String,
}

/// A selectable statement row: derived date key plus its selector id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    /// `YYYY-MM-DD`, suffixed `-0`, `-1`, … when the page shows several
    /// statements for the same calendar date.
    pub date_key: String,
    pub selector_id: String,
}

impl DocumentEntry {
    /// Local filename this statement persists under.
    pub fn file_name(&self) -> String {
        format!("{}.pdf", self.date_key)
    }
}

/// Capture the hidden-input state of the statement form.
///
/// Collects every hidden input into name→value pairs in document order,
/// then forces the synthetic mode field to pay-statement mode. A page
/// without the form is a structural fault: either the session desynced or
/// the credentials were rejected and the portal rendered an error page.
pub fn extract_form_snapshot(html: &str) -> Result<FormSnapshot, AppError> {
    let document = Html::parse_document(html);
    let form_sel =
        Selector::parse(&format!(r#"form[id="{STATEMENT_FORM_ID}"]"#)).expect("form selector");
    let hidden_sel = Selector::parse(r#"input[type="hidden"]"#).expect("hidden input selector");

    let form = document.select(&form_sel).next().ok_or_else(|| {
        AppError::PageStructureError(format!("form '{STATEMENT_FORM_ID}' not found on page"))
    })?;

    let mut snapshot = FormSnapshot::new();
    for input in form.select(&hidden_sel) {
        let Some(name) = input.value().attr("name") else {
            continue;
        };
        snapshot.insert(name, input.value().attr("value").unwrap_or(""));
    }
    snapshot.insert(MODE_FIELD, MODE_PAY_STATEMENTS);

    Ok(snapshot)
}

/// Collect the selectable year links.
///
/// An absent container means nothing to iterate, not a fault; anchors
/// missing an id or label are ignored.
pub fn extract_years(html: &str) -> Vec<YearEntry> {
    let document = Html::parse_document(html);
    let link_sel = Selector::parse(&format!(r#"span[id="{YEAR_LINKS_ID}"] a"#))
        .expect("year link selector");

    let mut years = Vec::new();
    for anchor in document.select(&link_sel) {
        let Some(id) = anchor.value().attr("id") else {
            continue;
        };
        let label: String = anchor.text().collect::<String>().trim().to_string();
        if label.is_empty() {
            continue;
        }
        years.push(YearEntry {
            label,
            selector_id: id.to_string(),
        });
    }
    years
}

/// Collect the statement rows of the documents table.
///
/// Each row's anchor shows a `MM/DD/YYYY` date; the derived key is ISO
/// `YYYY-MM-DD`, disambiguated with `-0`, `-1`, … when the same date
/// appears more than once (deterministic in row order). A missing table
/// yields an empty set; a date the portal renders in an unexpected format
/// is structural.
pub fn extract_documents(html: &str) -> Result<Vec<DocumentEntry>, AppError> {
    let document = Html::parse_document(html);
    let row_sel = Selector::parse(&format!(r#"table[id="{CHECKS_TABLE_ID}"] tr"#))
        .expect("statement row selector");
    let anchor_sel = Selector::parse("a").expect("anchor selector");

    let mut entries: Vec<DocumentEntry> = Vec::new();
    for row in document.select(&row_sel) {
        let Some(anchor) = row.select(&anchor_sel).next() else {
            continue;
        };
        let Some(id) = anchor.value().attr("id") else {
            continue;
        };
        let display: String = anchor.text().collect::<String>().trim().to_string();
        let date_key = derive_date_key(&display, &entries)?;
        entries.push(DocumentEntry {
            date_key,
            selector_id: id.to_string(),
        });
    }
    Ok(entries)
}

/// Locate the embedded frame carrying the download link.
///
/// The page returned by a statement selection embeds the document viewer in
/// a frame whose `src` is a host-relative path.
pub fn extract_frame_src(html: &str) -> Result<String, AppError> {
    let document = Html::parse_document(html);
    let frame_sel = Selector::parse("iframe").expect("frame selector");

    document
        .select(&frame_sel)
        .next()
        .and_then(|frame| frame.value().attr("src"))
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::PageStructureError("no embedded frame with a src on statement page".into())
        })
}

fn derive_date_key(display: &str, taken: &[DocumentEntry]) -> Result<String, AppError> {
    let date = NaiveDate::parse_from_str(display, "%m/%d/%Y").map_err(|e| {
        AppError::PageStructureError(format!("unparseable statement date '{display}': {e}"))
    })?;
    let base = date.format("%Y-%m-%d").to_string();

    let mut key = base.clone();
    let mut n = 0;
    while taken.iter().any(|entry| entry.date_key == key) {
        key = format!("{base}-{n}");
        n += 1;
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing_page(extra: &str) -> String {
        format!(
            r#"<html><body>
            <form id="statement" method="post" action="/iPay/private/listDoc.jsf">
                <input type="hidden" name="statement_SUBMIT" value="1"/>
                <input type="hidden" name="javax.faces.ViewState" value="j_id42"/>
                <input type="text" name="visible" value="nope"/>
                {extra}
            </form>
            </body></html>"#
        )
    }

    #[test]
    fn snapshot_collects_hidden_inputs_only() {
        let html = listing_page("");
        let snap = extract_form_snapshot(&html).unwrap();

        assert_eq!(snap.get("statement_SUBMIT"), Some("1"));
        assert_eq!(snap.get("javax.faces.ViewState"), Some("j_id42"));
        assert_eq!(snap.get("visible"), None);
    }

    #[test]
    fn snapshot_forces_statement_mode() {
        // even if the page carries the field with the W-2 value
        let html = listing_page(r#"<input type="hidden"
            name="statement:changeStatementsType" value="2"/>"#);
        let snap = extract_form_snapshot(&html).unwrap();

        assert_eq!(snap.get(MODE_FIELD), Some(MODE_PAY_STATEMENTS));
    }

    #[test]
    fn snapshot_round_trip_preserves_fields() {
        let html = listing_page("");
        let snap = extract_form_snapshot(&html).unwrap();

        let pairs: Vec<_> = snap.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("statement_SUBMIT", "1"),
                ("javax.faces.ViewState", "j_id42"),
                (MODE_FIELD, MODE_PAY_STATEMENTS),
            ]
        );
    }

    #[test]
    fn missing_form_is_structural() {
        let err = extract_form_snapshot("<html><body>login failed</body></html>").unwrap_err();
        assert!(matches!(err, AppError::PageStructureError(_)));
    }

    #[test]
    fn years_extracted_with_ids() {
        let html = r#"<span id="statement:yearLinks">
            <a id="statement:y2020">2020</a>
            <a id="statement:y2021">2021</a>
            <a>no id, skipped</a>
        </span>"#;

        let years = extract_years(html);
        assert_eq!(
            years,
            vec![
                YearEntry {
                    label: "2020".into(),
                    selector_id: "statement:y2020".into()
                },
                YearEntry {
                    label: "2021".into(),
                    selector_id: "statement:y2021".into()
                },
            ]
        );
    }

    #[test]
    fn no_year_container_yields_empty_set() {
        assert!(extract_years("<html><body></body></html>").is_empty());
    }

    #[test]
    fn documents_keyed_by_iso_date() {
        let html = r#"<table id="statement:checks">
            <tr><th>Date</th></tr>
            <tr><td><a id="statement:d0">02/01/2020</a></td></tr>
            <tr><td>no link in this row</td></tr>
            <tr><td><a id="statement:d1">01/05/2020</a></td></tr>
        </table>"#;

        let docs = extract_documents(html).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].date_key, "2020-02-01");
        assert_eq!(docs[1].date_key, "2020-01-05");
        assert_eq!(docs[1].file_name(), "2020-01-05.pdf");
    }

    #[test]
    fn duplicate_dates_get_numeric_suffixes() {
        let html = r#"<table id="statement:checks">
            <tr><td><a id="statement:d0">01/05/2020</a></td></tr>
            <tr><td><a id="statement:d1">01/05/2020</a></td></tr>
            <tr><td><a id="statement:d2">02/01/2020</a></td></tr>
        </table>"#;

        let docs = extract_documents(html).unwrap();
        let keys: Vec<_> = docs.iter().map(|d| d.date_key.as_str()).collect();
        assert_eq!(keys, vec!["2020-01-05", "2020-01-05-0", "2020-02-01"]);
    }

    #[test]
    fn missing_table_yields_empty_set() {
        assert!(extract_documents("<html><body></body></html>").unwrap().is_empty());
    }

    #[test]
    fn bad_date_is_structural() {
        let html = r#"<table id="statement:checks">
            <tr><td><a id="statement:d0">not a date</a></td></tr>
        </table>"#;
        let err = extract_documents(html).unwrap_err();
        assert!(matches!(err, AppError::PageStructureError(_)));
    }

    #[test]
    fn frame_src_extracted() {
        let html = r#"<html><body>
            <iframe src="/iPay/private/doc.pdf?id=7"></iframe>
        </body></html>"#;
        assert_eq!(
            extract_frame_src(html).unwrap(),
            "/iPay/private/doc.pdf?id=7"
        );
    }

    #[test]
    fn missing_frame_is_structural() {
        let err = extract_frame_src("<html><body></body></html>").unwrap_err();
        assert!(matches!(err, AppError::PageStructureError(_)));
    }
}
