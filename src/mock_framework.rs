//! # Mock Framework
//!
//! Utilities for testing services against a store without spawning its actor.
//!
//! [`create_mock_client`] returns a client plus the receiving end of its
//! channel. The `expect_*` helpers pull the next request off that channel and
//! hand back its payload together with the responder, so a test decides what
//! the "store" answers: success, a precondition failure, or nothing at all.

use crate::actor_framework::{Entity, Filter, Response, ResourceClient, ResourceRequest};
use tokio::sync::mpsc;

/// Creates a mock client and a receiver for asserting requests.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Next request must be a Create.
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Next request must be a Get.
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Next request must be an Update.
pub async fn expect_update<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Patch, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update { id, patch, respond_to }) => Some((id, patch, respond_to)),
        _ => None,
    }
}

/// Next request must be a List.
pub async fn expect_list<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Filter<T>, Response<Vec<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::List { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::FrameworkError;
    use crate::clients::{OrderClient, StoreError};
    use crate::domain::{Order, OrderChange, OrderItem, OrderStatus};
    use chrono::Utc;

    fn order(id: &str, user_id: &str, status: OrderStatus) -> Order {
        Order {
            id: id.into(),
            user_id: user_id.into(),
            claimed_by: None,
            claimed_at: None,
            original_user_id: None,
            status,
            items: vec![OrderItem { name: "Soup".into(), quantity: 1, price: 5.0 }],
            amount: 5.0,
            shelter: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_guarded_update_sends_expected_status() {
        let (inner, mut receiver) = create_mock_client::<Order>(10);
        let client = OrderClient::new(inner);

        let task = tokio::spawn(async move {
            client
                .update_order_if("order_1".into(), OrderStatus::Redistribute, OrderChange::Cancel)
                .await
        });

        let (id, patch, responder) = expect_update(&mut receiver).await.expect("Expected Update request");
        assert_eq!(id, "order_1");
        assert_eq!(patch.expected_status, Some(OrderStatus::Redistribute));
        responder
            .send(Err(FrameworkError::PreconditionFailed("status is Food Processing".into())))
            .unwrap();

        assert!(matches!(task.await.unwrap(), Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_orders_for_user_filters_and_sorts() {
        let (inner, mut receiver) = create_mock_client::<Order>(10);
        let client = OrderClient::new(inner);
        let task = tokio::spawn(async move { client.orders_for_user("U1".into()).await });

        let (filter, responder) = expect_list(&mut receiver).await.expect("Expected List request");
        let older = order("order_1", "U1", OrderStatus::Processing);
        let mut newer = order("order_2", "U1", OrderStatus::Delivered);
        newer.created_at = older.created_at + chrono::Duration::seconds(1);
        let stranger = order("order_3", "U9", OrderStatus::Processing);
        assert!(filter.matches(&older));
        assert!(!filter.matches(&stranger));

        responder.send(Ok(vec![older.clone(), newer.clone()])).unwrap();
        let ids: Vec<String> = task.await.unwrap().unwrap().into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["order_2".to_string(), "order_1".to_string()]);
    }

    #[tokio::test]
    async fn test_get_passes_id_through() {
        let (inner, mut receiver) = create_mock_client::<Order>(10);
        let client = OrderClient::new(inner);
        let task = tokio::spawn(async move { client.get_order("order_7".into()).await });

        let (id, responder) = expect_get(&mut receiver).await.expect("Expected Get request");
        assert_eq!(id, "order_7");
        responder.send(Ok(None)).unwrap();
        assert_eq!(task.await.unwrap(), Ok(None));
    }
}
