use futures::StreamExt;
use log::info;
use service_protos::store::v1::{
    DispatchActionRequest, DispatchActionResponse, DispatchEventRequest, DispatchEventResponse,
    SubscribeEventRequest, SubscribeEventResponse,
};
use service_protos::ubo::v1::{action, event, DisplayCompressedRenderEvent, Event};
use service_protos::{StoreService, StoreServiceServer};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use store_client::config::ClientConfig;
use store_client::frame::Rectangle;
use store_client::notification::sample_notification;
use store_client::{EventCategory, Frame, GrpcStore, StoreTransport, StreamConsumer};
use tokio::time::timeout;
use tokio_stream::wrappers::{TcpListenerStream, UnixListenerStream};
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use uuid::Uuid;

/// In-process store: records dispatches and streams one render event per
/// subscription before ending it.
#[derive(Clone, Default)]
struct TestStore {
    actions: Arc<Mutex<Vec<DispatchActionRequest>>>,
    events: Arc<Mutex<Vec<DispatchEventRequest>>>,
    filters: Arc<Mutex<Vec<Option<EventCategory>>>>,
    subscriptions: Arc<AtomicUsize>,
}

fn render_event(marker: u8) -> Event {
    Event {
        event: Some(event::Event::DisplayCompressedRenderEvent(
            DisplayCompressedRenderEvent {
                compressed_data: vec![marker],
                rectangle: vec![0, 0, 1, 1],
                density: 1,
            },
        )),
    }
}

#[tonic::async_trait]
impl StoreService for TestStore {
    type SubscribeEventStream = Pin<
        Box<dyn futures::Stream<Item = Result<SubscribeEventResponse, Status>> + Send + 'static>,
    >;

    async fn dispatch_action(
        &self,
        request: Request<DispatchActionRequest>,
    ) -> Result<Response<DispatchActionResponse>, Status> {
        self.actions.lock().unwrap().push(request.into_inner());
        Ok(Response::new(DispatchActionResponse {}))
    }

    async fn dispatch_event(
        &self,
        request: Request<DispatchEventRequest>,
    ) -> Result<Response<DispatchEventResponse>, Status> {
        self.events.lock().unwrap().push(request.into_inner());
        Ok(Response::new(DispatchEventResponse {}))
    }

    async fn subscribe_event(
        &self,
        request: Request<SubscribeEventRequest>,
    ) -> Result<Response<Self::SubscribeEventStream>, Status> {
        let filter = request.into_inner().event;
        self.filters
            .lock()
            .unwrap()
            .push(filter.as_ref().and_then(EventCategory::of));

        let n = self.subscriptions.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Test store: subscription {}", n);

        let responses = vec![
            // An empty response carries nothing and is skipped by the client
            Ok(SubscribeEventResponse { event: None }),
            Ok(SubscribeEventResponse {
                event: Some(render_event(n as u8)),
            }),
        ];
        Ok(Response::new(futures::stream::iter(responses).boxed()))
    }
}

async fn start_tcp_server(store: TestStore) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(
        Server::builder()
            .add_service(StoreServiceServer::new(store))
            .serve_with_incoming(TcpListenerStream::new(listener)),
    );
    port
}

fn tcp_config(port: u16) -> ClientConfig {
    ClientConfig {
        host: "127.0.0.1".to_string(),
        port,
        ..ClientConfig::default()
    }
}

#[tokio::test]
async fn test_dispatch_action_over_tcp() {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = TestStore::default();
    let port = start_tcp_server(store.clone()).await;

    let client = GrpcStore::connect(&tcp_config(port)).unwrap();
    client
        .dispatch_action(sample_notification("Hello", "test"))
        .await
        .unwrap();

    let actions = store.actions.lock().unwrap();
    assert_eq!(actions.len(), 1);
    assert!(matches!(
        actions[0].action.as_ref().and_then(|a| a.action.as_ref()),
        Some(action::Action::NotificationsAddAction(_))
    ));
}

#[tokio::test]
async fn test_dispatch_event_over_tcp() {
    let store = TestStore::default();
    let port = start_tcp_server(store.clone()).await;

    let client = GrpcStore::connect(&tcp_config(port)).unwrap();
    client.dispatch_event(render_event(9)).await.unwrap();

    let events = store.events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, Some(render_event(9)));
}

#[tokio::test]
async fn test_subscribe_sends_category_filter() {
    let store = TestStore::default();
    let port = start_tcp_server(store.clone()).await;

    let client = GrpcStore::connect(&tcp_config(port)).unwrap();
    let events: Vec<Event> = client
        .subscribe(EventCategory::CompressedRender)
        .await
        .unwrap()
        .map(|event| event.unwrap())
        .collect()
        .await;

    assert_eq!(events, vec![render_event(1)]);
    assert_eq!(
        *store.filters.lock().unwrap(),
        vec![Some(EventCategory::CompressedRender)]
    );
}

#[tokio::test]
async fn test_consumer_resubscribes_to_live_server() {
    let store = TestStore::default();
    let port = start_tcp_server(store.clone()).await;

    let transport: Arc<dyn StoreTransport> =
        Arc::new(GrpcStore::connect(&tcp_config(port)).unwrap());
    let frames = Arc::new(Mutex::new(Vec::new()));
    let recorded = frames.clone();
    let handle = StreamConsumer::new(transport)
        .with_reconnect_delay(Duration::from_millis(50))
        .start(EventCategory::CompressedRender, move |frame: Frame| {
            recorded.lock().unwrap().push(frame)
        });

    timeout(Duration::from_secs(5), async {
        while frames.lock().unwrap().len() < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("consumer should keep resubscribing");
    handle.abort();

    let frames = frames.lock().unwrap();
    for (i, frame) in frames.iter().take(3).enumerate() {
        assert_eq!(
            *frame,
            Frame::CompressedRender {
                compressed: vec![i as u8 + 1],
                rectangle: Rectangle::new(0, 0, 1, 1),
            }
        );
    }
}

#[tokio::test]
async fn test_unreachable_server_fails_the_call() {
    // Bind and drop to get a port nobody listens on
    let port = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let client = GrpcStore::connect(&tcp_config(port)).unwrap();
    assert!(client.subscribe(EventCategory::Audio).await.is_err());
    assert!(client
        .dispatch_action(sample_notification("Hello", "nobody home"))
        .await
        .is_err());
}

#[tokio::test]
async fn test_dispatch_over_unix_socket() {
    let socket_path = PathBuf::from(format!("/tmp/store_test_{}.sock", Uuid::new_v4()));
    let _ = std::fs::remove_file(&socket_path);

    let store = TestStore::default();
    let uds = tokio::net::UnixListener::bind(&socket_path).unwrap();
    tokio::spawn(
        Server::builder()
            .add_service(StoreServiceServer::new(store.clone()))
            .serve_with_incoming(UnixListenerStream::new(uds)),
    );

    let config = ClientConfig {
        unix_socket: Some(socket_path.clone()),
        ..ClientConfig::default()
    };
    let client = GrpcStore::connect(&config).unwrap();
    client
        .dispatch_action(sample_notification("Hello", "over unix"))
        .await
        .unwrap();
    assert_eq!(store.actions.lock().unwrap().len(), 1);

    let _ = std::fs::remove_file(&socket_path);
}
