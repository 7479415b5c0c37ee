//! # HTTP API Client
//!
//! Typed access to every REST endpoint the app uses: auth, profile, events,
//! points, coupons, transactions and organizer tools.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  method(args)                                                          │
//! │      │                                                                  │
//! │      ├── validate form locally ──────────► ClientError::Validation     │
//! │      │                                                                  │
//! │      ├── attach X-Request-Id (uuid v4)                                  │
//! │      ├── attach Bearer token from the shared session                   │
//! │      │       (missing on a protected route ──► NotAuthenticated)       │
//! │      ▼                                                                  │
//! │  reqwest send ─── transport failure ─────► ClientError::Http           │
//! │      │                                                                  │
//! │      ├── 2xx ──► decode { data: T } or T                               │
//! │      └── else ─► RemoteError { status, message verbatim, fields }      │
//! │                                                                         │
//! │  One attempt per call. Nothing is retried.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::Path;

use evently_core::forms::{
    ChangePasswordForm, CreateEventForm, CreatePromotionForm, EventQuery, ForgotPasswordForm,
    LoginForm, ProfileForm, RegisterForm, ResetPasswordForm, StatusUpdate, TransactionQuery,
};
use evently_core::types::{
    Coupon, Event, PointHistoryEntry, PointsSummary, Promotion, Transaction, User,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;
use uuid::Uuid;

use crate::api::CheckoutApi;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::protocol::{
    decode_enveloped, parse_error_body, CouponCheck, CouponsResponse, CreateTransactionRequest,
    LoginResponse, MessageResponse, Page, ProfileResponse,
};
use crate::session_store::SharedSession;

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Whether a route needs a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Required,
    /// Token attached when present.
    Optional,
    None,
}

/// REST client over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
    session: SharedSession,
}

impl HttpApi {
    /// Builds a client from the configuration and a shared session.
    pub fn new(config: &ClientConfig, session: SharedSession) -> ClientResult<Self> {
        config.validate()?;

        let mut builder = Client::builder().user_agent(config.api.user_agent.clone());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(HttpApi {
            client: builder.build()?,
            base_url: config.base_url()?,
            session,
        })
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        Ok(self.client.request(method, self.url(path)?))
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Sends one request and returns the raw success body.
    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        auth: Auth,
    ) -> ClientResult<Vec<u8>> {
        let token = match auth {
            Auth::None => None,
            Auth::Optional => self.session.read().await.token().map(String::from),
            Auth::Required => Some(
                self.session
                    .read()
                    .await
                    .token()
                    .map(String::from)
                    .ok_or(ClientError::NotAuthenticated)?,
            ),
        };

        let request_id = Uuid::new_v4();
        let mut request = request.header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let span = info_span!("api", operation, %request_id);
        async move {
            debug!("Sending request");
            let response = request.send().await.map_err(|e| {
                warn!(error = %e, "Request failed before a response");
                ClientError::Http(e)
            })?;

            let status = response.status();
            let body = response.bytes().await?;

            if status.is_success() {
                debug!(status = status.as_u16(), bytes = body.len(), "Request succeeded");
                return Ok(body.to_vec());
            }

            let remote = parse_error_body(status.as_u16(), &body);
            warn!(
                status = remote.status,
                message = %remote.message,
                "Server rejected request"
            );
            Err(ClientError::Remote(remote))
        }
        .instrument(span)
        .await
    }

    /// Sends and decodes a single-resource response.
    async fn fetch<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        auth: Auth,
    ) -> ClientResult<T> {
        let body = self.send(operation, request, auth).await?;
        decode_enveloped(&body).map_err(|e| {
            warn!(operation, error = %e, "Response did not match the expected shape");
            ClientError::Decode(format!("{}: {}", operation, e))
        })
    }

    /// Sends and decodes a body that is never enveloped.
    async fn fetch_bare<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
        auth: Auth,
    ) -> ClientResult<T> {
        let body = self.send(operation, request, auth).await?;
        serde_json::from_slice(&body).map_err(|e| {
            warn!(operation, error = %e, "Response did not match the expected shape");
            ClientError::Decode(format!("{}: {}", operation, e))
        })
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// `POST /auth/login`, then stores the token in the shared session.
    pub async fn login(&self, form: &LoginForm) -> ClientResult<User> {
        form.validate()?;
        let request = self.request(Method::POST, "auth/login")?.json(form);
        let response: LoginResponse = self.fetch("login", request, Auth::None).await?;

        self.session
            .write()
            .await
            .login(response.user.clone(), response.token)?;
        info!(user_id = %response.user.id, role = response.user.role.as_str(), "Logged in");
        Ok(response.user)
    }

    /// `POST /auth/register`. Does not sign in.
    pub async fn register(&self, form: &RegisterForm) -> ClientResult<MessageResponse> {
        form.validate()?;
        let request = self.request(Method::POST, "auth/register")?.json(form);
        let response: MessageResponse = self.fetch_bare("register", request, Auth::None).await?;
        info!(email = %form.email, "Registered");
        Ok(response)
    }

    /// Clears the shared session. Nothing is sent.
    pub async fn logout(&self) {
        self.session.write().await.logout();
        info!("Logged out");
    }

    /// `POST /auth/forgot-password`
    pub async fn forgot_password(&self, form: &ForgotPasswordForm) -> ClientResult<MessageResponse> {
        form.validate()?;
        let request = self.request(Method::POST, "auth/forgot-password")?.json(form);
        self.fetch_bare("forgot_password", request, Auth::None).await
    }

    /// `POST /auth/reset-password`
    pub async fn reset_password(&self, form: &ResetPasswordForm) -> ClientResult<MessageResponse> {
        form.validate()?;
        let request = self.request(Method::POST, "auth/reset-password")?.json(form);
        self.fetch_bare("reset_password", request, Auth::None).await
    }

    // =========================================================================
    // Profile
    // =========================================================================

    /// `GET /users/me/profile`, refreshing the cached user.
    pub async fn profile(&self) -> ClientResult<User> {
        let request = self.request(Method::GET, "users/me/profile")?;
        let response: ProfileResponse = self.fetch("profile", request, Auth::Required).await?;
        self.session.write().await.update_user(response.profile.clone());
        Ok(response.profile)
    }

    /// `PUT /users/me/profile`
    pub async fn update_profile(&self, form: &ProfileForm) -> ClientResult<User> {
        form.validate()?;
        let request = self.request(Method::PUT, "users/me/profile")?.json(form);
        let response: ProfileResponse =
            self.fetch("update_profile", request, Auth::Required).await?;
        self.session.write().await.update_user(response.profile.clone());
        Ok(response.profile)
    }

    /// `PUT /users/me/profile/picture`, multipart field `profile_picture`.
    pub async fn upload_profile_picture(&self, file: &Path) -> ClientResult<User> {
        let form = Form::new().part("profile_picture", file_part(file).await?);
        let request = self
            .request(Method::PUT, "users/me/profile/picture")?
            .multipart(form);
        let response: ProfileResponse =
            self.fetch("upload_profile_picture", request, Auth::Required).await?;
        self.session.write().await.update_user(response.profile.clone());
        Ok(response.profile)
    }

    /// `PUT /users/me/profile/password`
    pub async fn change_password(&self, form: &ChangePasswordForm) -> ClientResult<MessageResponse> {
        form.validate()?;
        let request = self
            .request(Method::PUT, "users/me/profile/password")?
            .json(form);
        self.fetch_bare("change_password", request, Auth::Required).await
    }

    // =========================================================================
    // Coupons
    // =========================================================================

    /// `GET /users/me/coupons/validate/{code}`
    pub async fn check_coupon(&self, code: &str) -> ClientResult<CouponCheck> {
        let code = code.trim();
        if code.is_empty() {
            return Err(evently_core::ValidationError::required("Coupon code").into());
        }
        let mut url = self.url("users/me/coupons/validate/")?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push(code);
        let request = self.client.get(url);
        self.fetch_bare("check_coupon", request, Auth::Required).await
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// `GET /events` with search and filter parameters.
    pub async fn list_events(&self, query: &EventQuery) -> ClientResult<Vec<Event>> {
        query.validate()?;
        let request = self.request(Method::GET, "events")?.query(query);
        self.fetch("list_events", request, Auth::Optional).await
    }

    /// `GET /events/meta/categories`
    pub async fn event_categories(&self) -> ClientResult<Vec<String>> {
        let request = self.request(Method::GET, "events/meta/categories")?;
        self.fetch("event_categories", request, Auth::None).await
    }

    /// `GET /events/meta/locations`
    pub async fn event_locations(&self) -> ClientResult<Vec<String>> {
        let request = self.request(Method::GET, "events/meta/locations")?;
        self.fetch("event_locations", request, Auth::None).await
    }

    // =========================================================================
    // Points
    // =========================================================================

    /// `GET /points/history`, every grant including spent and expired ones.
    pub async fn points_history(&self) -> ClientResult<Vec<PointHistoryEntry>> {
        let request = self.request(Method::GET, "points/history")?;
        self.fetch("points_history", request, Auth::Required).await
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// `GET /transactions`
    pub async fn my_transactions(&self, query: &TransactionQuery) -> ClientResult<Page<Transaction>> {
        query.validate()?;
        let request = self.request(Method::GET, "transactions")?.query(query);
        self.fetch_bare("my_transactions", request, Auth::Required).await
    }

    /// `GET /transactions/{id}`
    pub async fn transaction(&self, id: &str) -> ClientResult<Transaction> {
        let request = self.request(Method::GET, &format!("transactions/{}", id))?;
        self.fetch("transaction", request, Auth::Required).await
    }

    /// `PATCH /transactions/{id}/cancel`
    pub async fn cancel_transaction(&self, id: &str) -> ClientResult<Transaction> {
        let request = self.request(Method::PATCH, &format!("transactions/{}/cancel", id))?;
        let transaction: Transaction =
            self.fetch("cancel_transaction", request, Auth::Required).await?;
        info!(transaction_id = %transaction.id, status = %transaction.status, "Transaction cancelled");
        Ok(transaction)
    }

    /// `PATCH /transactions/{id}/payment-proof`, multipart field `payment_proof`.
    pub async fn upload_payment_proof(&self, id: &str, file: &Path) -> ClientResult<Transaction> {
        let form = Form::new().part("payment_proof", file_part(file).await?);
        let request = self
            .request(Method::PATCH, &format!("transactions/{}/payment-proof", id))?
            .multipart(form);
        let transaction: Transaction =
            self.fetch("upload_payment_proof", request, Auth::Required).await?;
        info!(transaction_id = %transaction.id, status = %transaction.status, "Payment proof uploaded");
        Ok(transaction)
    }

    // =========================================================================
    // Organizer
    // =========================================================================

    /// `GET /events/organizer/my-events`
    pub async fn my_events(&self) -> ClientResult<Vec<Event>> {
        let request = self.request(Method::GET, "events/organizer/my-events")?;
        self.fetch("my_events", request, Auth::Required).await
    }

    /// `POST /events`
    pub async fn create_event(&self, form: &CreateEventForm) -> ClientResult<Event> {
        form.validate()?;
        let request = self.request(Method::POST, "events")?.json(form);
        let event: Event = self.fetch("create_event", request, Auth::Required).await?;
        info!(event_id = %event.id, name = %event.name, "Event created");
        Ok(event)
    }

    /// `DELETE /events/{id}`. The response body is not inspected.
    pub async fn delete_event(&self, id: &str) -> ClientResult<()> {
        let request = self.request(Method::DELETE, &format!("events/{}", id))?;
        self.send("delete_event", request, Auth::Required).await?;
        info!(event_id = %id, "Event deleted");
        Ok(())
    }

    /// `POST /events/{id}/promotions`
    pub async fn create_promotion(
        &self,
        event_id: &str,
        form: &CreatePromotionForm,
    ) -> ClientResult<Promotion> {
        form.validate()?;
        let request = self
            .request(Method::POST, &format!("events/{}/promotions", event_id))?
            .json(form);
        let promotion: Promotion = self.fetch("create_promotion", request, Auth::Required).await?;
        info!(event_id, code = %promotion.code, "Promotion created");
        Ok(promotion)
    }

    /// `GET /transactions/organizer`
    pub async fn organizer_transactions(
        &self,
        query: &TransactionQuery,
    ) -> ClientResult<Page<Transaction>> {
        query.validate()?;
        let request = self
            .request(Method::GET, "transactions/organizer")?
            .query(query);
        self.fetch_bare("organizer_transactions", request, Auth::Required).await
    }

    /// `PATCH /transactions/{id}/status`
    pub async fn update_transaction_status(
        &self,
        id: &str,
        update: &StatusUpdate,
    ) -> ClientResult<Transaction> {
        update.validate()?;
        let request = self
            .request(Method::PATCH, &format!("transactions/{}/status", id))?
            .json(update);
        let transaction: Transaction = self
            .fetch("update_transaction_status", request, Auth::Required)
            .await?;
        info!(transaction_id = %transaction.id, status = %transaction.status, "Transaction reviewed");
        Ok(transaction)
    }
}

// =============================================================================
// Checkout API
// =============================================================================

impl CheckoutApi for HttpApi {
    async fn get_event(&self, event_id: &str) -> ClientResult<Event> {
        let request = self.request(Method::GET, &format!("events/{}", event_id))?;
        self.fetch("get_event", request, Auth::Optional).await
    }

    async fn my_coupons(&self) -> ClientResult<Vec<Coupon>> {
        let request = self.request(Method::GET, "users/me/coupons")?;
        let response: CouponsResponse = self.fetch("my_coupons", request, Auth::Required).await?;
        Ok(response.coupons)
    }

    async fn my_points(&self) -> ClientResult<PointsSummary> {
        let request = self.request(Method::GET, "points/my-points")?;
        self.fetch("my_points", request, Auth::Required).await
    }

    async fn create_transaction(
        &self,
        request: &CreateTransactionRequest,
    ) -> ClientResult<Transaction> {
        let builder = self.request(Method::POST, "transactions")?.json(request);
        self.fetch("create_transaction", builder, Auth::Required).await
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Reads a file into a multipart part with a content type from its extension.
async fn file_part(path: &Path) -> ClientResult<Part> {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();
    let part = Part::bytes(bytes)
        .file_name(file_name)
        .mime_str(mime_for(path))?;
    Ok(part)
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evently_core::session::AuthSession;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    fn api() -> HttpApi {
        let mut config = ClientConfig::default();
        config.api.base_url = "https://api.example.com/api".into();
        HttpApi::new(&config, Arc::new(RwLock::new(AuthSession::new()))).unwrap()
    }

    #[test]
    fn test_url_joining_keeps_prefix() {
        let api = api();
        assert_eq!(
            api.url("/transactions/abc/cancel").unwrap().as_str(),
            "https://api.example.com/api/transactions/abc/cancel"
        );
        assert_eq!(
            api.url("points/my-points").unwrap().as_str(),
            "https://api.example.com/api/points/my-points"
        );
    }

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for(Path::new("proof.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("receipt.pdf")), "application/pdf");
        assert_eq!(mime_for(Path::new("noext")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_protected_route_without_session_is_local_error() {
        let api = api();
        let err = api.my_coupons().await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_invalid_form_never_sent() {
        let api = api();
        let form = LoginForm {
            email: "not-an-email".into(),
            password: "secret".into(),
        };
        let err = api.login(&form).await.unwrap_err();
        assert!(err.is_local());
        assert!(!api.session().read().await.is_authenticated());
    }

    #[tokio::test]
    async fn test_invalid_promotion_never_sent() {
        use evently_core::forms::PromotionDiscount;
        use evently_core::money::Percentage;

        let api = api();
        let from = chrono::Utc::now();
        let form = CreatePromotionForm::new(
            Some("EARLY"),
            PromotionDiscount::Percentage(Percentage::from_bps(1000)),
            10,
            from,
            from - chrono::Duration::days(1),
        );
        let err = api.create_promotion("e-1", &form).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn test_organizer_event_routes_need_session() {
        let api = api();
        assert!(matches!(api.my_events().await, Err(ClientError::NotAuthenticated)));
        assert!(matches!(api.delete_event("e-1").await, Err(ClientError::NotAuthenticated)));
        assert!(matches!(api.points_history().await, Err(ClientError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_inverted_price_filter_never_sent() {
        let api = api();
        let query = EventQuery {
            min_price: Some(evently_core::money::Money::from_rupiah(200_000)),
            max_price: Some(evently_core::money::Money::from_rupiah(100_000)),
            ..Default::default()
        };
        assert!(api.list_events(&query).await.unwrap_err().is_local());
    }

    #[tokio::test]
    async fn test_reject_without_reason_never_sent() {
        let api = api();
        api.session()
            .write()
            .await
            .login(
                User {
                    id: "o-1".into(),
                    email: "org@example.com".into(),
                    full_name: "Organizer".into(),
                    role: evently_core::types::Role::Organizer,
                    phone_number: None,
                    profile_picture: None,
                    referral_code: None,
                },
                "jwt",
            )
            .unwrap();

        let err = api
            .update_transaction_status("t-1", &StatusUpdate::reject(""))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
