//! Site profile: the reporting site's wire-level form contract.
//!
//! The legacy server is a stateful JSF application. Emitting one report takes
//! two POSTs to the same URL: a **select** step that parametrises the report
//! inside the server-side session (AJAX form, response discarded) and a
//! **download** step that presses the rendered page's print button and
//! returns the PDF bytes.
//!
//! Every header name, field identifier, and date encoding below is an
//! artefact of that one server UI, liable to change without notice — which
//! is exactly why they live in a plain data struct with overridable values
//! instead of constants baked into the orchestrator. [`SiteProfile::default`]
//! carries the identifiers the production site used when this crate was
//! written.
//!
//! Requests are built fresh per call from the profile plus the per-unit
//! values; nothing is shared or mutated between units.

use crate::scrape::ReportUnit;
use crate::transport::FormRequest;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/72.0.3626.81 Safari/537.36";

/// Endpoint URL plus the header sets and form-field templates of the two
/// POST steps.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// The single form endpoint both steps POST to.
    pub url: String,

    /// Fixed headers of the select step.
    pub select_headers: Vec<(String, String)>,
    /// Fixed headers of the download step.
    pub download_headers: Vec<(String, String)>,

    /// Fixed form fields of the select step (view state, form identifiers).
    pub select_fields: Vec<(String, String)>,
    /// Complete form fields of the download step (print-button coordinates).
    pub download_fields: Vec<(String, String)>,

    /// Field carrying the report type (small integer as text).
    pub type_field: String,
    /// Field carrying the human-readable date, e.g. `"Mai 5, 2014"`.
    pub date_label_field: String,
    /// Field carrying the machine-readable date, e.g. `"05/2014"`.
    pub date_numeric_field: String,

    /// Cookie name holding the session identifier.
    pub session_cookie: String,
}

impl Default for SiteProfile {
    fn default() -> Self {
        let pairs = |items: &[(&str, &str)]| {
            items
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<Vec<_>>()
        };

        Self {
            url: "http://sinfat.ima.sc.gov.br/publico/relatorios/index_er.jsf".into(),

            select_headers: pairs(&[
                ("Accept", "*/*"),
                ("Accept-Language", "en-US;q=0.8,en;q=0.7"),
                ("Cache-Control", "no-cache"),
                (
                    "Content-Type",
                    "application/x-www-form-urlencoded; charset=UTF-8",
                ),
                ("Origin", "http://sinfat.ima.sc.gov.br"),
                ("Pragma", "no-cache"),
                ("Referer", "http://sinfat.ima.sc.gov.br/relatorio.jsp"),
                ("User-Agent", USER_AGENT),
            ]),

            download_headers: pairs(&[
                (
                    "Accept",
                    "text/html,application/xhtml+xml,application/xml;q=0.9,\
                     image/webp,image/apng,*/*;q=0.8",
                ),
                ("Accept-Language", "en-US;q=0.8,en;q=0.7"),
                ("Cache-Control", "no-cache"),
                ("Content-Type", "application/x-www-form-urlencoded"),
                ("Origin", "http://sinfat.ima.sc.gov.br"),
                ("Pragma", "no-cache"),
                ("Referer", "http://sinfat.ima.sc.gov.br/relatorio.jsp"),
                ("Upgrade-Insecure-Requests", "1"),
                ("User-Agent", USER_AGENT),
            ]),

            select_fields: pairs(&[
                ("AJAXREQUEST", "j_id_jsp_1801007148_0"),
                (
                    "formularioDeEmissaoDeRelatorio",
                    "formularioDeEmissaoDeRelatorio",
                ),
                ("javax.faces.ViewState", "j_id1"),
                (
                    "formularioDeEmissaoDeRelatorio:j_id_jsp_1801007148_36",
                    "formularioDeEmissaoDeRelatorio:j_id_jsp_1801007148_36",
                ),
            ]),

            download_fields: pairs(&[
                ("j_id_jsp_1801007148_253", "j_id_jsp_1801007148_253"),
                ("j_id_jsp_1801007148_253:btImprimir.x", "290"),
                ("j_id_jsp_1801007148_253:btImprimir.y", "508"),
                ("javax.faces.ViewState", "j_id1"),
            ]),

            type_field: "formularioDeEmissaoDeRelatorio:inTipoRelatorio".into(),
            date_label_field:
                "formularioDeEmissaoDeRelatorio:j_id_jsp_1801007148_33InputDate".into(),
            date_numeric_field:
                "formularioDeEmissaoDeRelatorio:j_id_jsp_1801007148_33InputCurrentDate".into(),

            session_cookie: "JSESSIONID".into(),
        }
    }
}

impl SiteProfile {
    fn cookie_header(&self, session_id: &str) -> (String, String) {
        (
            "Cookie".into(),
            format!("{}={}", self.session_cookie, session_id),
        )
    }

    /// Build the parameter-selection POST for one unit.
    ///
    /// The date goes out twice, mirroring the JSF calendar widget: a
    /// human-readable label (the day-of-month is irrelevant to a monthly
    /// report, the site's own UI always submits the 5th) and a numeric
    /// `MM/YYYY` companion field.
    pub fn select_request(&self, session_id: &str, unit: &ReportUnit) -> FormRequest {
        let mut headers = self.select_headers.clone();
        headers.push(self.cookie_header(session_id));

        let mut form = self.select_fields.clone();
        form.push((self.type_field.clone(), unit.report_type.to_string()));
        form.push((
            self.date_label_field.clone(),
            format!("{} 5, {}", unit.date.label(), unit.date.year),
        ));
        form.push((
            self.date_numeric_field.clone(),
            format!("{:02}/{}", unit.date.month, unit.date.year),
        ));

        FormRequest {
            url: self.url.clone(),
            headers,
            form,
        }
    }

    /// Build the print/download POST. Carries no per-unit data — the server
    /// session already holds the parameters from the preceding select step.
    pub fn download_request(&self, session_id: &str) -> FormRequest {
        let mut headers = self.download_headers.clone();
        headers.push(self.cookie_header(session_id));

        FormRequest {
            url: self.url.clone(),
            headers,
            form: self.download_fields.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::dates::MonthYear;

    fn unit() -> ReportUnit {
        ReportUnit {
            report_type: 3,
            date: MonthYear {
                month: 5,
                year: 2014,
            },
        }
    }

    fn field<'a>(form: &'a [(String, String)], name: &str) -> &'a str {
        form.iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or_else(|| panic!("missing field {name}"))
    }

    #[test]
    fn select_request_encodes_type_and_both_dates() {
        let profile = SiteProfile::default();
        let req = profile.select_request("ABC123", &unit());

        assert_eq!(field(&req.form, &profile.type_field), "3");
        assert_eq!(field(&req.form, &profile.date_label_field), "Mai 5, 2014");
        assert_eq!(field(&req.form, &profile.date_numeric_field), "05/2014");
    }

    #[test]
    fn both_steps_carry_the_session_cookie() {
        let profile = SiteProfile::default();

        for req in [
            profile.select_request("ABC123", &unit()),
            profile.download_request("ABC123"),
        ] {
            let cookie = req
                .headers
                .iter()
                .find(|(k, _)| k == "Cookie")
                .map(|(_, v)| v.as_str())
                .expect("missing Cookie header");
            assert_eq!(cookie, "JSESSIONID=ABC123");
        }
    }

    #[test]
    fn requests_are_built_fresh_per_call() {
        let profile = SiteProfile::default();
        let a = profile.select_request("S", &unit());

        let other = ReportUnit {
            report_type: 6,
            date: MonthYear {
                month: 12,
                year: 2019,
            },
        };
        let b = profile.select_request("S", &other);

        // The first request is unaffected by the second build.
        assert_eq!(field(&a.form, &profile.type_field), "3");
        assert_eq!(field(&b.form, &profile.type_field), "6");
        assert_eq!(field(&b.form, &profile.date_numeric_field), "12/2019");
    }

    #[test]
    fn download_request_has_no_per_unit_fields() {
        let profile = SiteProfile::default();
        let req = profile.download_request("S");
        assert!(req.form.iter().all(|(k, _)| k != &profile.type_field));
    }
}
