//! In-process stand-in for the portal. It checks tokens the way the real one does and
//! records every request it receives.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Form, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use timetracker::{FormFields, SiteProfile, TrackerUrl};

const SESSION_COOKIE: &str = "ASP.NET_SessionId=mock-session";
pub const PASSWORD: &str = "correct horse";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: &'static str,
    pub form: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_post_to(&self, path: &str) -> bool {
        self.method == "POST" && self.path == path
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MockOptions {
    /// Second generation pages re-render the category list in the project update.
    pub categories_in_update: bool,
    pub reject_submit: bool,
    /// Answer the project postback with this record instead of an update.
    pub project_update_fault: Option<DeltaFault>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaFault {
    ServerError,
    PageRedirect,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            categories_in_update: true,
            reject_submit: false,
            project_update_fault: None,
        }
    }
}

#[derive(Clone)]
struct Portal {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    options: MockOptions,
    fields: FormFields,
}

impl Portal {
    fn record(&self, method: &'static str, path: &'static str, form: Vec<(String, String)>) {
        self.requests
            .lock()
            .unwrap()
            .push(RecordedRequest { method, path, form });
    }
}

pub struct MockPortal {
    pub site: Arc<SiteProfile>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockPortal {
    pub async fn start() -> Self {
        Self::start_with(MockOptions::default()).await
    }

    pub async fn start_with(options: MockOptions) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let portal = Portal {
            requests: requests.clone(),
            options,
            fields: FormFields::default(),
        };

        let app = Router::new()
            .route("/", get(login_page).post(login))
            .route("/ListaTimeTracker.aspx", get(list_page).post(filter_list))
            .route("/TimeTrackerAdd.aspx", get(entry_form).post(entry_postback))
            .with_state(portal);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base_url = TrackerUrl::parse(&format!("http://{}", addr)).unwrap();
        Self {
            site: Arc::new(SiteProfile::for_base_url(base_url)),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn posts_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.is_post_to(path))
            .collect()
    }
}

async fn login_page(State(portal): State<Portal>) -> Response {
    portal.record("GET", "/", Vec::new());
    Html(login_html()).into_response()
}

async fn login(State(portal): State<Portal>, Form(form): Form<Vec<(String, String)>>) -> Response {
    portal.record("POST", "/", form.clone());

    let fields = &portal.fields;
    let accepted = value(&form, &fields.password) == Some(PASSWORD)
        && value(&form, &fields.login_button) == Some("Login")
        && has_tokens(&form, "login");
    if !accepted {
        return Html(login_html()).into_response();
    }

    (
        StatusCode::FOUND,
        [
            (header::LOCATION, "/ListaTimeTracker.aspx"),
            (header::SET_COOKIE, "ASP.NET_SessionId=mock-session; path=/; HttpOnly"),
        ],
    )
        .into_response()
}

async fn list_page(State(portal): State<Portal>, headers: HeaderMap) -> Response {
    portal.record("GET", "/ListaTimeTracker.aspx", Vec::new());
    if !logged_in(&headers) {
        return to_login();
    }
    Html(format!("<html><body><form>{}</form></body></html>", tokens_html("list"))).into_response()
}

async fn filter_list(
    State(portal): State<Portal>,
    headers: HeaderMap,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    portal.record("POST", "/ListaTimeTracker.aspx", form.clone());
    if !logged_in(&headers) {
        return to_login();
    }

    let fresh = has_tokens(&form, "list") || has_tokens(&form, "list-filtered");
    if !fresh || value(&form, "__EVENTTARGET") != Some(portal.fields.report_filter_target.as_str()) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Invalid postback or callback argument").into_response();
    }

    let rows = [
        ("05/10/2026", "8.00", "Acme - Web Platform", "Development", "Login page"),
        ("06/10/2026", "7.50", "Acme - Web Platform", "Meetings", "Sprint planning &amp; grooming"),
        ("09/10/2026", "8.00", "BairesDev - Absence", "National Holiday", "PTO"),
    ];
    let body: String = rows
        .iter()
        .map(|(date, hours, project, category, text)| {
            format!(
                "<tr class=\"row\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                date, hours, project, category, text
            )
        })
        .collect();

    Html(format!(
        r#"<html><body><form>{}
        <table class="tbl-respuestas" cellspacing="0">
            <tr><th>Date</th><th>Hours</th><th>Project</th><th>Assignment Type</th><th>Description</th></tr>
            {}
            <tr class="total"><td>Total</td><td>23.50</td><td></td><td></td><td></td></tr>
        </table></form></body></html>"#,
        tokens_html("list-filtered"),
        body
    ))
    .into_response()
}

async fn entry_form(State(portal): State<Portal>, headers: HeaderMap) -> Response {
    portal.record("GET", "/TimeTrackerAdd.aspx", Vec::new());
    if !logged_in(&headers) {
        return to_login();
    }

    let fields = &portal.fields;
    Html(format!(
        "<html><body><form>{}{}{}</form></body></html>",
        tokens_html("form-0"),
        select(
            &fields.project,
            &[
                ("1021", "Acme - Web Platform"),
                ("1034", "Acme - Mobile"),
                ("9000", "BairesDev - Absence"),
            ]
        ),
        select(&fields.category, &all_categories()),
    ))
    .into_response()
}

async fn entry_postback(
    State(portal): State<Portal>,
    headers: HeaderMap,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    portal.record("POST", "/TimeTrackerAdd.aspx", form.clone());
    if !logged_in(&headers) {
        return to_login();
    }

    let fields = &portal.fields;
    if value(&form, "__ASYNCPOST") == Some("true") {
        let trigger = value(&form, &fields.script_manager).unwrap_or_default();
        if trigger == fields.partial_trigger(&fields.project) {
            return project_update(&portal, &form);
        }
        if trigger == fields.partial_trigger(&fields.category) {
            return category_update(&portal, &form);
        }
        return delta_error("Unknown trigger");
    }

    let accepted = !portal.options.reject_submit
        && has_tokens(&form, "form-2")
        && value(&form, &fields.submit_button) == Some("Accept")
        && value(&form, &fields.task).is_some_and(|v| !v.is_empty());
    if !accepted {
        return Html(format!("<html><body>{}</body></html>", tokens_html("form-2"))).into_response();
    }

    (StatusCode::FOUND, [(header::LOCATION, "/ListaTimeTracker.aspx")]).into_response()
}

fn project_update(portal: &Portal, form: &[(String, String)]) -> Response {
    if !has_tokens(form, "form-0") {
        return delta_error("Invalid viewstate");
    }
    match portal.options.project_update_fault {
        Some(DeltaFault::ServerError) => return delta_error("Object reference not set to an instance of an object."),
        Some(DeltaFault::PageRedirect) => {
            return text_response(delta(&[("pageRedirect", "", "/Login.aspx?ReturnUrl=%2fTimeTrackerAdd.aspx")]))
        }
        None => {}
    }

    let fields = &portal.fields;
    let categories = match value(form, &fields.project) {
        Some("9000") => vec![("20", "National Holiday"), ("21", "Vacations")],
        Some("1021") | Some("1034") => vec![("7", "Development"), ("8", "Meetings")],
        _ => return delta_error("Unknown project"),
    };

    let markup = if portal.options.categories_in_update {
        select(&fields.category, &categories)
    } else {
        "<span>Hours</span>".to_string()
    };
    delta_response(&markup, "form-1")
}

fn category_update(portal: &Portal, form: &[(String, String)]) -> Response {
    if !has_tokens(form, "form-1") {
        return delta_error("Invalid viewstate");
    }

    let fields = &portal.fields;
    let tasks = match value(form, &fields.category) {
        Some("7") => vec![("71", "Coding"), ("72", "Code Review")],
        Some("8") => vec![("81", "Daily")],
        Some("20") => vec![("200", "National Holiday")],
        Some("21") => vec![("210", "Vacations")],
        _ => return delta_error("Unknown category"),
    };

    let markup = format!(
        "<table><tr><td>{}</td></tr><tr><td><textarea name=\"{}\"></textarea></td></tr><tr><td>{}</td></tr></table>",
        select(&fields.task, &tasks),
        fields.comment,
        select(&fields.focal, &[("55", "Jane Roe"), ("56", "John Smith")]),
    );
    delta_response(&markup, "form-2")
}

fn value<'a>(form: &'a [(String, String)], name: &str) -> Option<&'a str> {
    form.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
}

fn has_tokens(form: &[(String, String)], generation: &str) -> bool {
    value(form, "__VIEWSTATE") == Some(format!("{}-vs", generation).as_str())
        && value(form, "__EVENTVALIDATION") == Some(format!("{}-ev", generation).as_str())
}

fn logged_in(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|cookies| cookies.contains(SESSION_COOKIE))
}

fn to_login() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response()
}

fn all_categories() -> Vec<(&'static str, &'static str)> {
    vec![
        ("7", "Development"),
        ("8", "Meetings"),
        ("20", "National Holiday"),
        ("21", "Vacations"),
    ]
}

fn login_html() -> String {
    let fields = FormFields::default();
    format!(
        r#"<html><body><form method="post" action="./">{}
        <input name="{}" type="text" id="{}" />
        <input name="{}" type="password" id="{}" />
        <input type="submit" name="{}" value="Login" />
        </form></body></html>"#,
        tokens_html("login"),
        fields.username,
        fields.username.replace('$', "_"),
        fields.password,
        fields.password.replace('$', "_"),
        fields.login_button,
    )
}

fn tokens_html(generation: &str) -> String {
    [
        ("__EVENTTARGET", String::new()),
        ("__EVENTARGUMENT", String::new()),
        ("__VIEWSTATE", format!("{}-vs", generation)),
        ("__VIEWSTATEGENERATOR", "CA0B0334".to_string()),
        ("__EVENTVALIDATION", format!("{}-ev", generation)),
    ]
    .iter()
    .map(|(name, value)| format!(r#"<input type="hidden" name="{0}" id="{0}" value="{1}" />"#, name, value))
    .collect()
}

fn select(name: &str, options: &[(&str, &str)]) -> String {
    let options: String = options
        .iter()
        .map(|(value, label)| format!(r#"<option value="{}">{}</option>"#, value, label))
        .collect();
    format!(
        r#"<select name="{}" id="{}"><option selected="selected" value=""></option>{}</select>"#,
        name,
        name.replace('$', "_"),
        options
    )
}

fn delta_response(markup: &str, generation: &str) -> Response {
    let view_state = format!("{}-vs", generation);
    let validation = format!("{}-ev", generation);
    let payload = delta(&[
        ("updatePanel", "ctl00_ContentPlaceHolder_UpdatePanel1", markup),
        ("hiddenField", "__EVENTTARGET", ""),
        ("hiddenField", "__EVENTARGUMENT", ""),
        ("hiddenField", "__LASTFOCUS", ""),
        ("hiddenField", "__VIEWSTATE", &view_state),
        ("hiddenField", "__VIEWSTATEGENERATOR", "CA0B0334"),
        ("hiddenField", "__EVENTVALIDATION", &validation),
        ("asyncPostBackControlIDs", "", ""),
    ]);
    text_response(payload)
}

fn delta_error(message: &str) -> Response {
    text_response(delta(&[("error", "500", message)]))
}

fn text_response(payload: String) -> Response {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], payload).into_response()
}

fn delta(records: &[(&str, &str, &str)]) -> String {
    records
        .iter()
        .map(|(kind, id, content)| format!("{}|{}|{}|{}|", content.chars().count(), kind, id, content))
        .collect()
}
