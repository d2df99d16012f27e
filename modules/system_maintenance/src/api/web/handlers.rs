//! HTML request handlers
//!
//! Gated handlers receive the `Principal` that `guard::require_sysadmin`
//! attached to the request.

use super::error::WebError;
use super::pages::{self, LoginForm};
use super::WebContext;
use crate::api::session::{clear_session_cookie, current_principal, session_cookie, session_token};
use crate::contract::{
    DocumentationFilter, Id, MaintenanceError, PageRequest, Principal, RawRecordKind, RecordFilter,
};
use crate::domain::auth::{is_authorized, is_super_admin};
use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use std::sync::Arc;

const REQUIRED: &str = "This field is required.";
const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";
const INACTIVE: &str = "This account is inactive.";

/// `?page=N`, kept as text so malformed values become a 404 rather than a 400
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    fn request(&self, per_page: u64) -> Result<PageRequest, WebError> {
        let page = match self.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => match raw.parse::<u64>() {
                Ok(page) if page >= 1 => page,
                _ => return Err(WebError::not_found()),
            },
        };
        Ok(PageRequest::new(page, per_page))
    }
}

fn parse_id(raw: &str) -> Result<Id, WebError> {
    raw.parse().map_err(|_| WebError::not_found())
}

// ===== Gated views =====

pub async fn home(
    Extension(ctx): Extension<Arc<WebContext>>,
    Extension(principal): Extension<Principal>,
) -> Result<Html<String>, WebError> {
    let counts = ctx.service.entity_counts().await?;
    Ok(Html(pages::home_page(
        &ctx.paths,
        &principal,
        &counts,
        is_super_admin(&principal),
    )))
}

pub async fn documentation_list(
    Extension(ctx): Extension<Arc<WebContext>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, WebError> {
    let request = query.request(ctx.paginate_by)?;
    let page = ctx
        .service
        .list_documentation_summaries(&DocumentationFilter::default(), request)
        .await?;
    Ok(Html(pages::documentation_list_page(
        &ctx.paths, &principal, &page,
    )))
}

pub async fn documentation_detail(
    Extension(ctx): Extension<Arc<WebContext>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let detail = ctx.service.documentation_detail(parse_id(&id)?).await?;
    Ok(Html(pages::documentation_detail_page(
        &ctx.paths, &principal, &detail,
    )))
}

pub async fn record_list(
    Extension(ctx): Extension<Arc<WebContext>>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, WebError> {
    let request = query.request(ctx.paginate_by)?;
    let page = ctx
        .service
        .list_record_summaries(&RecordFilter::default(), request)
        .await?;
    Ok(Html(pages::record_list_page(&ctx.paths, &principal, &page)))
}

pub async fn record_detail(
    Extension(ctx): Extension<Arc<WebContext>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Html<String>, WebError> {
    let detail = ctx.service.record_detail(parse_id(&id)?).await?;
    Ok(Html(pages::record_detail_page(&ctx.paths, &principal, &detail)))
}

pub async fn raw_view(
    Extension(ctx): Extension<Arc<WebContext>>,
    Extension(principal): Extension<Principal>,
    Path((record_type, field_name, id)): Path<(String, String, String)>,
) -> Result<Html<String>, WebError> {
    let kind = RawRecordKind::from_path(&record_type).ok_or_else(WebError::not_found)?;
    let raw = ctx
        .service
        .raw_field(kind, &field_name, parse_id(&id)?)
        .await?;
    Ok(Html(pages::raw_page(&ctx.paths, &principal, &raw)))
}

// ===== Authentication =====

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Login form; signed-in users without access get a notice above it
pub async fn login_form(
    Extension(ctx): Extension<Arc<WebContext>>,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Result<Html<String>, WebError> {
    let principal = current_principal(&ctx.service, &headers).await?;
    let unauthorized_notice = principal.as_ref().is_some_and(|p| !is_authorized(p));
    Ok(Html(pages::login_page(
        &ctx.paths,
        &LoginForm {
            next: query.next.as_deref(),
            unauthorized_notice,
            ..Default::default()
        },
    )))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

pub async fn login(
    Extension(ctx): Extension<Arc<WebContext>>,
    Form(req): Form<LoginRequest>,
) -> Result<Response, WebError> {
    let username_missing = req.username.trim().is_empty();
    let password_missing = req.password.is_empty();
    let mut form = LoginForm {
        username: &req.username,
        next: req.next.as_deref(),
        username_error: username_missing.then_some(REQUIRED),
        password_error: password_missing.then_some(REQUIRED),
        ..Default::default()
    };
    if username_missing || password_missing {
        return Ok(Html(pages::login_page(&ctx.paths, &form)).into_response());
    }

    let session = match ctx.service.login(&req.username, &req.password).await {
        Ok(session) => session,
        Err(MaintenanceError::InvalidCredentials) => {
            form.form_error = Some(BAD_CREDENTIALS);
            return Ok(Html(pages::login_page(&ctx.paths, &form)).into_response());
        }
        Err(MaintenanceError::InactiveAccount) => {
            form.form_error = Some(INACTIVE);
            return Ok(Html(pages::login_page(&ctx.paths, &form)).into_response());
        }
        Err(err) => return Err(err.into()),
    };

    let cookie = session_cookie(&session.token, ctx.session_ttl, ctx.secure_cookies)
        .ok_or(WebError(MaintenanceError::Internal))?;
    let mut response = Redirect::to(&ctx.paths.safe_next(req.next.as_deref())).into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

pub async fn logout(
    Extension(ctx): Extension<Arc<WebContext>>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    if let Some(token) = session_token(&headers) {
        ctx.service.logout(&token).await?;
    }
    let mut response = Redirect::to(&ctx.paths.home()).into_response();
    response
        .headers_mut()
        .insert(header::SET_COOKIE, clear_session_cookie());
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>) -> PageQuery {
        PageQuery {
            page: page.map(str::to_string),
        }
    }

    #[test]
    fn test_page_query_parsing() {
        assert_eq!(query(None).request(10).unwrap().page, 1);
        assert_eq!(query(Some("3")).request(10).unwrap().page, 3);
        assert!(query(Some("0")).request(10).is_err());
        assert!(query(Some("last")).request(10).is_err());
        assert!(query(Some("-1")).request(10).is_err());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(parse_id("abc").is_err());
    }
}
