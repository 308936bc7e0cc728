//! # Delivery Guarantees
//!
//! Talks to the service queues directly, bypassing the gateway, to check
//! what the routers do with frames the gateway would never send.

#[cfg(test)]
mod tests {
    use super::super::harness::TestCourier;
    use serde_json::json;
    use shared_bus::{decode_reply, encode_request, Consumer, QueueTransport};
    use shared_types::{CommandName, CorrelationId, ErrorKind};
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    const REPLY_QUEUE: &str = "delivery-test.reply";

    async fn reply_consumer(courier: &TestCourier) -> Consumer {
        let broker = courier.broker();
        broker.declare(REPLY_QUEUE).await.unwrap();
        broker.consume(REPLY_QUEUE).await.unwrap()
    }

    async fn next_reply(consumer: &mut Consumer) -> shared_bus::ReplyFrame {
        let delivery = timeout(Duration::from_secs(2), consumer.next())
            .await
            .expect("reply in time")
            .expect("consumer open");
        let frame = decode_reply(delivery.body()).unwrap();
        delivery.ack();
        frame
    }

    async fn settled(courier: &TestCourier, queue: &str) -> bool {
        for _ in 0..50 {
            let broker = courier.broker();
            if broker.ready_count(queue) == 0 && broker.unacked_count(queue) == 0 {
                return true;
            }
            sleep(Duration::from_millis(20)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_malformed_payload_is_answered_and_acked() {
        let courier = TestCourier::start().await;
        let mut replies = reply_consumer(&courier).await;
        let id = CorrelationId::new();

        let body = encode_request(CommandName::Login, id, REPLY_QUEUE, &json!({"email": 5})).unwrap();
        courier.broker().publish("auth_queue", body).await.unwrap();

        let reply = next_reply(&mut replies).await;
        assert_eq!(reply.id, id);
        let err = reply.into_result().unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedPayload);
        assert!(settled(&courier, "auth_queue").await);

        courier.shutdown().await;
    }

    #[tokio::test]
    async fn test_foreign_and_unknown_commands_are_answered() {
        let courier = TestCourier::start().await;
        let mut replies = reply_consumer(&courier).await;

        // A profile command on the auth queue
        let id = CorrelationId::new();
        let body = encode_request(CommandName::GetProfile, id, REPLY_QUEUE, &json!({"id": 1})).unwrap();
        courier.broker().publish("auth_queue", body).await.unwrap();
        let err = next_reply(&mut replies).await.into_result().unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownCommand);

        let id = CorrelationId::new();
        let raw = json!({
            "pattern": {"cmd": "drop-tables"},
            "id": id,
            "reply_to": REPLY_QUEUE,
            "data": {}
        });
        courier
            .broker()
            .publish("profile_queue", serde_json::to_vec(&raw).unwrap())
            .await
            .unwrap();
        let reply = next_reply(&mut replies).await;
        assert_eq!(reply.id, id);
        assert_eq!(reply.into_result().unwrap_err().kind, ErrorKind::UnknownCommand);

        assert!(settled(&courier, "auth_queue").await);
        assert!(settled(&courier, "profile_queue").await);
        courier.shutdown().await;
    }

    #[tokio::test]
    async fn test_unreadable_frame_is_dropped_without_reply() {
        let courier = TestCourier::start().await;
        let mut replies = reply_consumer(&courier).await;
        let acked_before = courier.broker().stats().acked();

        courier
            .broker()
            .publish("profile_queue", b"not a command".to_vec())
            .await
            .unwrap();

        assert!(settled(&courier, "profile_queue").await);
        assert!(courier.broker().stats().acked() > acked_before);
        assert!(timeout(Duration::from_millis(200), replies.next()).await.is_err());

        courier.shutdown().await;
    }

    #[tokio::test]
    async fn test_every_delivery_acked_once_across_a_flow() {
        let courier = TestCourier::start().await;
        courier.register("ivan", "ivan@mail.ru").await;
        courier.register("petr", "petr@mail.ru").await;

        for queue in ["auth_queue", "profile_queue"] {
            assert!(settled(&courier, queue).await, "{queue} not settled");
        }
        let stats = courier.broker().stats();
        assert_eq!(stats.requeued(), 0);

        courier.shutdown().await;
    }
}
