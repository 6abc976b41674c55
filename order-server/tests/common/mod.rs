//! Shared harness for the integration tests: an in-memory database, the
//! real router and recording mocks for the three external collaborators.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use order_server::db::DbService;
use order_server::services::gateway::{
    GatewayCharge, GatewayError, GatewayOrder, GatewayOrderRequest, GatewayTransaction,
    PaymentGateway,
};
use order_server::services::{
    AttachmentFetcher, MessageButton, Messaging, MessagingError, Scheduler, SchedulerError,
};
use order_server::utils::AppResult;
use order_server::{api, Config, ServerState};
use shared::util::now_millis;

/// Scripted gateway answer for the next create_order call.
#[derive(Debug, Clone)]
pub enum GatewayScript {
    Pending,
    Paid,
    Reject(String),
}

pub struct MockGateway {
    script: Mutex<Vec<GatewayScript>>,
    pub requests: Mutex<Vec<GatewayOrderRequest>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, script: GatewayScript) {
        self.script.lock().unwrap().push(script);
    }

    fn order(charge_status: &str) -> GatewayOrder {
        GatewayOrder {
            id: "or_1".into(),
            status: charge_status.into(),
            charges: vec![GatewayCharge {
                id: "ch_1".into(),
                status: charge_status.into(),
                last_transaction: Some(GatewayTransaction {
                    pdf: Some("http://gw.test/boleto.pdf".into()),
                    line: Some("34191.79001".into()),
                    qr_code: Some("000201qrpayload".into()),
                    qr_code_url: Some("http://gw.test/qr.png".into()),
                }),
            }],
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(&self, req: &GatewayOrderRequest) -> Result<GatewayOrder, GatewayError> {
        self.requests.lock().unwrap().push(req.clone());
        let script = self.script.lock().unwrap().pop().unwrap_or(GatewayScript::Pending);
        match script {
            GatewayScript::Pending => Ok(Self::order("pending")),
            GatewayScript::Paid => Ok(Self::order("paid")),
            GatewayScript::Reject(msg) => Err(GatewayError::Rejected(msg)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub phone: String,
    pub message: String,
    pub file_url: Option<String>,
    pub buttons: Vec<(String, String)>,
}

#[derive(Default)]
pub struct MockMessaging {
    pub sent: Mutex<Vec<SentMessage>>,
}

impl MockMessaging {
    fn record(&self, phone: &str, message: &str, file_url: Option<&str>, buttons: &[MessageButton]) {
        self.sent.lock().unwrap().push(SentMessage {
            phone: phone.into(),
            message: message.into(),
            file_url: file_url.map(Into::into),
            buttons: buttons.iter().map(|b| (b.id.clone(), b.label.clone())).collect(),
        });
    }

    pub fn messages_to(&self, phone: &str) -> Vec<SentMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.phone == phone)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Messaging for MockMessaging {
    async fn send_text(&self, phone: &str, message: &str) -> Result<(), MessagingError> {
        self.record(phone, message, None, &[]);
        Ok(())
    }

    async fn send_file(
        &self,
        phone: &str,
        message: &str,
        file_url: &str,
    ) -> Result<(), MessagingError> {
        self.record(phone, message, Some(file_url), &[]);
        Ok(())
    }

    async fn send_button_list(
        &self,
        phone: &str,
        message: &str,
        buttons: &[MessageButton],
    ) -> Result<(), MessagingError> {
        self.record(phone, message, None, buttons);
        Ok(())
    }
}

/// Serves a canned PDF for any attachment url.
pub struct StubFetcher;

#[async_trait]
impl AttachmentFetcher for StubFetcher {
    async fn fetch(&self, _url: &str) -> AppResult<Vec<u8>> {
        Ok(b"%PDF-1.4".to_vec())
    }
}

#[derive(Default)]
pub struct MockScheduler {
    pub scheduled: Mutex<Vec<(i64, String, Value)>>,
}

#[async_trait]
impl Scheduler for MockScheduler {
    async fn schedule(
        &self,
        trigger_at: i64,
        path: &str,
        data: Value,
    ) -> Result<(), SchedulerError> {
        self.scheduled
            .lock()
            .unwrap()
            .push((trigger_at, path.into(), data));
        Ok(())
    }
}

pub struct TestApp {
    pub state: ServerState,
    pub router: Router,
    pub gateway: Arc<MockGateway>,
    pub messaging: Arc<MockMessaging>,
    pub scheduler: Arc<MockScheduler>,
}

pub const CUSTOMER_PHONE: &str = "5511999990000";
pub const SUPPLIER_PHONE: &str = "5511888880000";

impl TestApp {
    pub async fn spawn() -> Self {
        let db = DbService::open_in_memory().await.unwrap();
        let gateway = Arc::new(MockGateway::new());
        let messaging = Arc::new(MockMessaging::default());
        let scheduler = Arc::new(MockScheduler::default());
        let state = ServerState::with_clients(
            Config::for_tests(),
            db,
            gateway.clone(),
            messaging.clone(),
            scheduler.clone(),
            Arc::new(StubFetcher),
        );
        let router = api::router(state.clone());
        Self {
            state,
            router,
            gateway,
            messaging,
            scheduler,
        }
    }

    /// Contact c1 / city ct1 / product p1 (R$150) / supplier s1 covering
    /// zips 01000000..01999999 (freight R$20) producing p1 (cost R$80).
    pub async fn seed(&self) {
        let pool = &self.state.db.pool;
        let now = now_millis();
        sqlx::query(
            "INSERT INTO contact (id, name, phone, document, created_at) \
             VALUES ('c1', 'Ana', ?, '123.456.789-00', ?)",
        )
        .bind(CUSTOMER_PHONE)
        .bind(now)
        .execute(pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO city (id, name, state) VALUES ('ct1', 'São Paulo', 'SP')")
            .execute(pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO product (id, name, price) VALUES ('p1', 'Buquê Primavera', 150.0)")
            .execute(pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO supplier (id, name, phone, created_at) \
             VALUES ('s1', 'Floricultura Jardim', ?, ?)",
        )
        .bind(SUPPLIER_PHONE)
        .bind(now)
        .execute(pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO supplier_coverage (id, supplier_id, zip_start, zip_end, freight) \
             VALUES ('cov1', 's1', '01000000', '01999999', 20.0)",
        )
        .execute(pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO supplier_product (id, supplier_id, product_id, cost) \
             VALUES ('sp1', 's1', 'p1', 80.0)",
        )
        .execute(pool)
        .await
        .unwrap();
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder.body(Body::from(json.to_string())).unwrap()
            }
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn order_status(&self, order_id: &str) -> String {
        let (status, body) = self
            .request("GET", &format!("/api/orders/{order_id}"), None)
            .await;
        assert_eq!(status, StatusCode::OK, "order fetch failed: {body}");
        body["status"].as_str().unwrap().to_string()
    }

    pub async fn payment_ids(&self, order_id: &str) -> Vec<String> {
        sqlx::query_scalar::<_, String>(
            "SELECT id FROM payment WHERE order_id = ? ORDER BY created_at ASC",
        )
        .bind(order_id)
        .fetch_all(&self.state.db.pool)
        .await
        .unwrap()
    }

    pub async fn payment_status(&self, payment_id: &str) -> String {
        sqlx::query_scalar::<_, String>("SELECT status FROM payment WHERE id = ?")
            .bind(payment_id)
            .fetch_one(&self.state.db.pool)
            .await
            .unwrap()
    }
}

/// Default order creation payload (boleto unless overridden).
pub fn order_payload(method: &str, paid: bool) -> Value {
    serde_json::json!({
        "contact_id": "c1",
        "product_id": "p1",
        "user_id": "u1",
        "delivery_period": "AFTERNOON",
        "delivery_until": now_millis() + 6 * 60 * 60 * 1000,
        "street": "Rua das Flores",
        "number": "123",
        "neighborhood": "Centro",
        "city_id": "ct1",
        "zip": "01310-100",
        "payment": { "method": method, "amount": 170.0, "paid": paid }
    })
}
