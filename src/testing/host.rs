// Test host: composition root for an application under test.
//
// Purpose
// - Run an application router against in-memory messaging so tests can assert on what it
//   published without a broker or other services.
//
// Responsibilities
// - Own one events log, one external event producer, one external command bus and a no-op
//   external consumer per host.
// - Hand the fakes to the application factory explicitly.
// - Offer request helpers and event assertions to tests.

use crate::shared::core::event::{Event, PublishedEvent};
use crate::shared::core::retry_policy::RetryPolicy;
use crate::shared::infrastructure::event_bus::in_memory::InMemoryEventBus;
use crate::shared::infrastructure::event_bus::with_external_producer::EventBusWithExternalProducer;
use crate::shared::infrastructure::event_bus::{EventBus, EventBusError};
use crate::shared::infrastructure::external_commands::in_memory::InMemoryExternalCommandBus;
use crate::shared::infrastructure::external_commands::{ExternalCommand, ExternalCommandBus};
use crate::shared::infrastructure::external_events::ExternalEventConsumer;
use crate::shared::infrastructure::external_events::in_memory::{
    InMemoryExternalEventProducer, NoopExternalEventConsumer,
};
use crate::testing::config::TestHostConfig;
use crate::testing::events_log::{EventListener, EventsLog};
use crate::testing::eventually::{AssertionError, assert_eventually};
use crate::testing::logging::init_tracing;
use anyhow::Context;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode, header::CONTENT_TYPE};
use http_body_util::BodyExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::trace::TraceLayer;
use tracing::info;

/// What the application under test receives instead of its production messaging.
#[derive(Clone)]
pub struct HostServices {
    /// Publishes in process, then forwards external events to the recorded producer.
    pub event_bus: Arc<dyn EventBus>,
    /// The in-process bus behind `event_bus`, for subscribing application handlers.
    pub internal_event_bus: Arc<InMemoryEventBus>,
    pub external_command_bus: Arc<dyn ExternalCommandBus>,
    pub schema_name: String,
}

#[derive(Debug, Clone)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct TestHost {
    config: TestHostConfig,
    router: Router,
    services: HostServices,
    events_log: Arc<EventsLog>,
    external_event_producer: Arc<InMemoryExternalEventProducer>,
    external_command_bus: Arc<InMemoryExternalCommandBus>,
    external_event_consumer: Arc<NoopExternalEventConsumer>,
}

impl TestHost {
    pub async fn new<F>(config: TestHostConfig, factory: F) -> anyhow::Result<Self>
    where
        F: FnOnce(&HostServices) -> anyhow::Result<Router>,
    {
        init_tracing();

        let events_log = Arc::new(EventsLog::new());
        let external_event_producer = Arc::new(InMemoryExternalEventProducer::new());
        let external_command_bus = Arc::new(InMemoryExternalCommandBus::new());
        let external_event_consumer = Arc::new(NoopExternalEventConsumer::new());

        let internal_event_bus = Arc::new(InMemoryEventBus::new());
        internal_event_bus.subscribe_all(Arc::new(EventListener::new(events_log.clone())));
        let event_bus: Arc<dyn EventBus> = Arc::new(EventBusWithExternalProducer::new(
            internal_event_bus.clone(),
            external_event_producer.clone(),
        ));

        let services = HostServices {
            event_bus,
            internal_event_bus,
            external_command_bus: external_command_bus.clone(),
            schema_name: config.schema_name.clone(),
        };

        external_event_consumer
            .start()
            .await
            .context("starting external event consumer")?;

        let router = factory(&services)
            .context("building application router")?
            .layer(TraceLayer::new_for_http());

        info!(schema_name = %config.schema_name, "test host ready");

        Ok(Self {
            config,
            router,
            services,
            events_log,
            external_event_producer,
            external_command_bus,
            external_event_consumer,
        })
    }

    pub fn config(&self) -> &TestHostConfig {
        &self.config
    }

    pub fn schema_name(&self) -> &str {
        &self.config.schema_name
    }

    pub fn services(&self) -> &HostServices {
        &self.services
    }

    pub fn events_log(&self) -> &EventsLog {
        &self.events_log
    }

    pub fn is_external_consumer_started(&self) -> bool {
        self.external_event_consumer.is_started()
    }

    // ==================== Requests ====================

    pub async fn send(&self, request: Request<Body>) -> anyhow::Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();
        Ok(TestResponse { status, body })
    }

    pub async fn get(&self, uri: &str) -> anyhow::Result<TestResponse> {
        self.send(Request::get(uri).body(Body::empty())?).await
    }

    pub async fn post_json<T: Serialize>(
        &self,
        uri: &str,
        body: &T,
    ) -> anyhow::Result<TestResponse> {
        let request = Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body)?))?;
        self.send(request).await
    }

    // ==================== Internal events ====================

    pub async fn publish_internal_event<E: Event>(&self, event: E) -> Result<(), EventBusError> {
        self.services
            .event_bus
            .publish(PublishedEvent::new(event))
            .await
    }

    pub async fn published_internal_events_of_type<E: Event + Clone>(&self) -> Vec<E> {
        self.events_log.events_of_type::<E>().await
    }

    /// Waits, with the configured retry policy, for exactly one published `E` matching
    /// `predicate`.
    pub async fn should_publish_internal_event_of_type<E, F>(
        &self,
        predicate: F,
    ) -> Result<(), AssertionError>
    where
        E: Event,
        F: Fn(&E) -> bool,
    {
        self.should_publish_internal_event_of_type_with(predicate, self.config.retry_policy)
            .await
    }

    pub async fn should_publish_internal_event_of_type_with<E, F>(
        &self,
        predicate: F,
        policy: RetryPolicy,
    ) -> Result<(), AssertionError>
    where
        E: Event,
        F: Fn(&E) -> bool,
    {
        assert_eventually(self.events_log.as_ref(), predicate, policy).await
    }

    // ==================== External integrations ====================

    pub async fn published_external_events_of_type<E: Event + Clone>(&self) -> Vec<E> {
        self.external_event_producer.events_of_type::<E>().await
    }

    /// Checks once, without retrying, that at least one external `E` was produced.
    pub async fn should_publish_external_event_of_type<E: Event + Clone>(
        &self,
    ) -> Result<(), AssertionError> {
        if self.published_external_events_of_type::<E>().await.is_empty() {
            return Err(AssertionError::Missing {
                event_type: E::event_type(),
            });
        }
        Ok(())
    }

    pub async fn sent_external_commands(&self) -> Vec<ExternalCommand> {
        self.external_command_bus.sent_commands().await
    }

    pub async fn sent_external_commands_to(&self, path: &str) -> Vec<ExternalCommand> {
        self.external_command_bus.sent_to(path).await
    }
}
