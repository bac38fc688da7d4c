use itertools::Itertools;
use scraper::{ElementRef, Html};

use crate::{config::Markers, record::Record};

/// Record containers of one page, in document order.
///
/// The primary marker wins; the fallback marker is only consulted when the
/// primary one finds nothing on the page. An empty result means the end of
/// the registry.
pub fn extract_records<'a>(html: &'a Html, markers: &'a Markers) -> Vec<ElementRef<'a>> {
    let records = markers.container.in_document(html).collect_vec();
    if !records.is_empty() {
        return records;
    }
    match &markers.fallback_container {
        Some(fallback) => fallback.in_document(html).collect_vec(),
        None => records,
    }
}

pub fn parse_record(element: ElementRef, markers: &Markers, name_label: &str) -> Record {
    let name = markers
        .name
        .first_in(element)
        .map(stripped_text)
        .unwrap_or_default();
    let mut record = Record::new(name_label, name);
    for row in markers.row.in_element(element) {
        let (Some(label), Some(value)) = (markers.label.first_in(row), markers.value.first_in(row))
        else {
            continue;
        };
        let label = stripped_text(label)
            .trim_end_matches(':')
            .trim()
            .to_owned();
        record.insert(label, spaced_text(value));
    }
    record
}

/// Text fragments trimmed one by one and concatenated without separator.
fn stripped_text(element: ElementRef) -> String {
    element.text().map(str::trim).collect()
}

/// Words of all text fragments joined by single spaces.
fn spaced_text(element: ElementRef) -> String {
    element.text().flat_map(str::split_whitespace).join(" ")
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use scraper::Html;

    use super::{extract_records, parse_record};
    use crate::config::{Markers, Registry};

    fn markers() -> Markers {
        Registry::Bas.config().markers
    }

    fn names(html: &Html, markers: &Markers) -> Vec<String> {
        extract_records(html, markers)
            .into_iter()
            .map(|e| parse_record(e, markers, "Nome").get("Nome").unwrap().to_owned())
            .collect()
    }

    const CARD: &str = r#"
        <div class="societa_elem_int clearfix">
          <div class="nome-soc"> A.S.D. <b>Polisportiva</b> Roma </div>
          <p class="riga"><span class="label">Codice fiscale :</span><span class="value">  97 123
            456 </span></p>
          <p class="riga"><span class="label">Sport:</span><span class="value"><a>Calcio</a>, <a>Tennis</a></span></p>
          <p class="riga"><span class="label">Orfana</span></p>
          <p class="riga"><span class="value">senza etichetta</span></p>
          <p class="riga"><span class="label">Sport:</span><span class="value">Nuoto</span></p>
        </div>"#;

    #[test]
    fn parses_card() {
        let html = Html::parse_document(CARD);
        let markers = markers();
        let records = extract_records(&html, &markers);
        assert_eq!(records.len(), 1);
        let record = parse_record(records[0], &markers, "Nome associazione");
        assert_eq!(
            record.iter().collect_vec(),
            [
                ("Nome associazione", "A.S.D.PolisportivaRoma"),
                ("Codice fiscale", "97 123 456"),
                ("Sport", "Nuoto"),
            ]
        );
    }

    #[test]
    fn parsing_is_idempotent() {
        let html = Html::parse_document(CARD);
        let markers = markers();
        let element = extract_records(&html, &markers)[0];
        assert_eq!(
            parse_record(element, &markers, "Nome"),
            parse_record(element, &markers, "Nome")
        );
    }

    #[test]
    fn missing_name_is_empty() {
        let html = Html::parse_document(
            r#"<div class="societa_elem_int"><p class="riga"><span class="label">Comune:</span><span class="value">Bari</span></p></div>"#,
        );
        let markers = markers();
        let record = parse_record(extract_records(&html, &markers)[0], &markers, "Nome");
        assert_eq!(record.get("Nome"), Some(""));
        assert_eq!(record.get("Comune"), Some("Bari"));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn label_strips_colons_and_whitespace() {
        let html = Html::parse_document(
            r#"<div class="societa_elem_int"><p class="riga"><span class="label">  Indirizzo:: </span><span class="value">Via Roma</span></p></div>"#,
        );
        let markers = markers();
        let record = parse_record(extract_records(&html, &markers)[0], &markers, "Nome");
        assert_eq!(record.get("Indirizzo"), Some("Via Roma"));
    }

    #[test]
    fn nested_marker_preferred_in_document_order() {
        let html = Html::parse_document(
            r#"
            <div class="societa_elem"><div class="nome-soc">plain</div></div>
            <div class="societa_elem_int"><div class="nome-soc">first</div></div>
            <div class="societa_elem_int"><div class="nome-soc">second</div></div>"#,
        );
        assert_eq!(names(&html, &markers()), ["first", "second"]);
    }

    #[test]
    fn falls_back_to_plain_marker() {
        let html = Html::parse_document(
            r#"
            <div class="societa_elem"><div class="nome-soc">one</div></div>
            <div class="societa_elem"><div class="nome-soc">two</div></div>"#,
        );
        assert_eq!(names(&html, &markers()), ["one", "two"]);

        let cip = Registry::Cip.config().markers;
        assert!(extract_records(&html, &cip).is_empty());
    }

    #[test]
    fn page_without_containers_is_empty() {
        let html = Html::parse_document("<html><body><p>Nessun risultato</p></body></html>");
        assert!(extract_records(&html, &markers()).is_empty());
    }
}
