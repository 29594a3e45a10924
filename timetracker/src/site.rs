use std::time::Duration;

use crate::{LeaveKind, TimeTrackerError, TrackerUrl};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_13_3) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/64.0.3282.186 Safari/537.36";

/// Everything that ties the client to one deployment of the portal: URLs, the header
/// profile the server expects from a browser, and the legacy form field names.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub base_url: TrackerUrl,
    pub login_path: String,
    pub list_path: String,
    pub entry_form_path: String,
    pub headers: HeaderProfile,
    pub fields: FormFields,
    pub tokens: TokenNames,
    pub absence: AbsenceLabels,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct HeaderProfile {
    pub host: String,
    pub user_agent: String,
    pub origin: String,
    pub referer: String,
}

#[derive(Debug, Clone)]
pub struct FormFields {
    pub username: String,
    pub password: String,
    pub login_button: String,
    pub login_button_value: String,
    pub script_manager: String,
    pub update_panel: String,
    pub date: String,
    pub date_to: String,
    pub project: String,
    pub category: String,
    pub task: String,
    pub hours: String,
    pub comment: String,
    pub focal: String,
    pub submit_button: String,
    pub submit_button_value: String,
    pub report_filter_target: String,
    pub async_post: String,
}

#[derive(Debug, Clone)]
pub struct TokenNames {
    /// Every hidden field carried from one step to the next.
    pub all: Vec<String>,
    /// Fields without which the next postback is rejected.
    pub required: Vec<String>,
    pub event_target: String,
    pub event_argument: String,
    pub view_state_encrypted: String,
}

#[derive(Debug, Clone)]
pub struct AbsenceLabels {
    pub project: String,
    pub pto: LeaveLabels,
    pub vacation: LeaveLabels,
}

#[derive(Debug, Clone)]
pub struct LeaveLabels {
    pub category: String,
    pub task: String,
    pub default_comment: String,
}

impl AbsenceLabels {
    pub fn for_kind(&self, kind: LeaveKind) -> &LeaveLabels {
        match kind {
            LeaveKind::Pto => &self.pto,
            LeaveKind::Vacation => &self.vacation,
        }
    }
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::for_base_url(TrackerUrl::default())
    }
}

impl SiteProfile {
    /// Profile for the portal at `TIMETRACKER_URL`, or the public portal.
    pub fn from_env() -> Result<Self, TimeTrackerError> {
        Ok(Self::for_base_url(TrackerUrl::from_env()?))
    }

    pub fn for_base_url(base_url: TrackerUrl) -> Self {
        let headers = HeaderProfile {
            host: base_url.host_header(),
            user_agent: USER_AGENT.to_string(),
            origin: base_url.origin(),
            referer: format!("{}/", base_url.origin()),
        };

        Self {
            base_url,
            login_path: "/".to_string(),
            list_path: "ListaTimeTracker.aspx".to_string(),
            entry_form_path: "TimeTrackerAdd.aspx".to_string(),
            headers,
            fields: FormFields::default(),
            tokens: TokenNames::default(),
            absence: AbsenceLabels::default(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn login_url(&self) -> TrackerUrl {
        self.base_url.append_path(&self.login_path)
    }

    pub fn list_url(&self) -> TrackerUrl {
        self.base_url.append_path(&self.list_path)
    }

    pub fn entry_form_url(&self) -> TrackerUrl {
        self.base_url.append_path(&self.entry_form_path)
    }
}

impl FormFields {
    /// Value of the script manager field announcing which control triggered a partial
    /// postback.
    pub fn partial_trigger(&self, field: &str) -> String {
        format!("{}|{}", self.update_panel, field)
    }
}

impl Default for FormFields {
    fn default() -> Self {
        let field = |name: &str| format!("ctl00$ContentPlaceHolder${}", name);

        Self {
            username: field("UserNameTextBox"),
            password: field("PasswordTextBox"),
            login_button: field("LoginButton"),
            login_button_value: "Login".to_string(),
            script_manager: field("ScriptManager"),
            update_panel: field("UpdatePanel1"),
            date: field("txtFrom"),
            date_to: field("txtTo"),
            project: field("idProyectoDropDownList"),
            category: field("idCategoriaTareaXCargoLaboralDropDownList"),
            task: field("idTareaXCargoLaboralDownList"),
            hours: field("TiempoTextBox"),
            comment: field("CommentsTextBox"),
            focal: field("idFocalPointClientDropDownList"),
            submit_button: field("btnAceptar"),
            submit_button_value: "Accept".to_string(),
            report_filter_target: field("AplicarFiltroLinkButton"),
            async_post: "__ASYNCPOST".to_string(),
        }
    }
}

impl Default for TokenNames {
    fn default() -> Self {
        let all = [
            "__EVENTTARGET",
            "__EVENTARGUMENT",
            "__LASTFOCUS",
            "__VIEWSTATE",
            "__VIEWSTATEGENERATOR",
            "__EVENTVALIDATION",
        ];

        Self {
            all: all.iter().map(|s| s.to_string()).collect(),
            required: vec!["__VIEWSTATE".to_string(), "__EVENTVALIDATION".to_string()],
            event_target: "__EVENTTARGET".to_string(),
            event_argument: "__EVENTARGUMENT".to_string(),
            view_state_encrypted: "__VIEWSTATEENCRYPTED".to_string(),
        }
    }
}

impl Default for AbsenceLabels {
    fn default() -> Self {
        Self {
            project: "BairesDev - Absence".to_string(),
            pto: LeaveLabels {
                category: "National Holiday".to_string(),
                task: "National Holiday".to_string(),
                default_comment: "PTO".to_string(),
            },
            vacation: LeaveLabels {
                category: "Vacations".to_string(),
                task: "Vacations".to_string(),
                default_comment: "Vacations".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_follows_base_url() {
        let base = TrackerUrl::parse("http://127.0.0.1:4000").unwrap();
        let site = SiteProfile::for_base_url(base);

        assert_eq!(site.headers.host, "127.0.0.1:4000");
        assert_eq!(site.headers.origin, "http://127.0.0.1:4000");
        assert_eq!(site.list_url().as_ref(), "http://127.0.0.1:4000/ListaTimeTracker.aspx");
        assert_eq!(site.login_url().as_ref(), "http://127.0.0.1:4000/");
    }

    #[test]
    fn partial_trigger_names_update_panel_and_field() {
        let fields = FormFields::default();
        assert_eq!(
            fields.partial_trigger(&fields.project),
            "ctl00$ContentPlaceHolder$UpdatePanel1|ctl00$ContentPlaceHolder$idProyectoDropDownList"
        );
    }
}
