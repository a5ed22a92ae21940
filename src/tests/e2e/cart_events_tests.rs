use crate::shared::core::retry_policy::RetryPolicy;
use crate::shared::infrastructure::external_commands::CommandMethod;
use crate::testing::config::TestHostConfig;
use crate::testing::eventually::AssertionError;
use crate::testing::host::TestHost;
use crate::tests::fixtures::app::{
    AddProductBody, OpenCartBody, OpenCartResponse, PAYMENTS_PATH, PAYMENTS_URL, cart_app,
};
use crate::tests::fixtures::events::{CartConfirmed, CartOpened, ProductAdded, RequestPayment};
use axum::http::StatusCode;
use rstest::rstest;

async fn start_host() -> TestHost {
    TestHost::new(
        TestHostConfig::new().with_retry_policy(RetryPolicy::new(5, 20)),
        cart_app,
    )
    .await
    .expect("host failed to start")
}

async fn open_cart(host: &TestHost, client_id: &str) -> String {
    let response = host
        .post_json(
            "/carts",
            &OpenCartBody {
                client_id: client_id.into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::CREATED);
    response.json::<OpenCartResponse>().unwrap().cart_id
}

#[rstest]
#[tokio::test]
async fn opening_a_cart_publishes_cart_opened() {
    let host = start_host().await;

    let cart_id = open_cart(&host, "client-0001").await;

    host.should_publish_internal_event_of_type::<CartOpened, _>(|e| {
        e.cart_id == cart_id && e.client_id == "client-0001"
    })
    .await
    .expect("CartOpened should be published");
    assert!(host.published_external_events_of_type::<CartOpened>().await.is_empty());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn adding_a_product_is_published_eventually() {
    let host = start_host().await;
    let cart_id = open_cart(&host, "client-0001").await;

    let response = host
        .post_json(
            &format!("/carts/{cart_id}/products"),
            &AddProductBody {
                product_id: "product-0001".into(),
                quantity: 2,
            },
        )
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::ACCEPTED);

    assert_eq!(
        host.should_publish_internal_event_of_type_with::<ProductAdded, _>(
            |e| e.cart_id == cart_id,
            RetryPolicy::no_retries(),
        )
        .await,
        Err(AssertionError::Unmet {
            event_type: "ProductAdded",
            found: 0,
            expected: 1,
        })
    );

    host.should_publish_internal_event_of_type::<ProductAdded, _>(|e| {
        e.cart_id == cart_id && e.product_id == "product-0001" && e.quantity == 2
    })
    .await
    .expect("ProductAdded should be published within the retry budget");
}

#[rstest]
#[tokio::test]
async fn confirming_a_cart_publishes_externally_and_requests_payment() {
    let host = start_host().await;
    let cart_id = open_cart(&host, "client-0001").await;

    assert_eq!(
        host.should_publish_external_event_of_type::<CartConfirmed>().await,
        Err(AssertionError::Missing {
            event_type: "CartConfirmed"
        })
    );

    let response = host
        .send(
            axum::http::Request::post(format!("/carts/{cart_id}/confirm"))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::OK);

    host.should_publish_internal_event_of_type::<CartConfirmed, _>(|e| e.cart_id == cart_id)
        .await
        .expect("CartConfirmed should be published internally");
    host.should_publish_external_event_of_type::<CartConfirmed>()
        .await
        .expect("CartConfirmed should be produced externally");

    let commands = host.sent_external_commands_to(PAYMENTS_PATH).await;
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].method, CommandMethod::Post);
    assert_eq!(commands[0].url, PAYMENTS_URL);
    assert_eq!(
        commands[0].body_as::<RequestPayment>().unwrap(),
        RequestPayment { cart_id }
    );
    assert_eq!(host.sent_external_commands().await.len(), 1);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn publishing_the_same_event_twice_fails_the_exactly_once_check() {
    let host = start_host().await;
    let event = CartOpened::new("cart-0001", "client-0001");
    host.publish_internal_event(event.clone()).await.unwrap();
    host.publish_internal_event(event).await.unwrap();

    let result = host
        .should_publish_internal_event_of_type::<CartOpened, _>(|e| e.cart_id == "cart-0001")
        .await;

    assert_eq!(
        result,
        Err(AssertionError::Unmet {
            event_type: "CartOpened",
            found: 2,
            expected: 1,
        })
    );
    assert_eq!(host.published_internal_events_of_type::<CartOpened>().await.len(), 2);
}

#[rstest]
#[tokio::test]
async fn each_host_gets_its_own_schema_and_event_log() {
    let first = start_host().await;
    let second = TestHost::new(TestHostConfig::new().with_schema_name("carts_e2e"), cart_app)
        .await
        .unwrap();

    assert_ne!(first.schema_name(), second.schema_name());
    assert_eq!(second.get("/schema").await.unwrap().text(), "carts_e2e");
    assert_eq!(
        first.get("/schema").await.unwrap().text(),
        first.schema_name()
    );

    open_cart(&first, "client-0001").await;
    assert_eq!(first.events_log().len().await, 1);
    assert!(second.events_log().is_empty().await);
}
