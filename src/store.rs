use crate::config::ClientConfig;
use crate::error::StoreError;
use crate::frame::EventCategory;
use futures::stream::BoxStream;
use futures::StreamExt;
use log::{debug, info};
use service_protos::store::v1::{
    DispatchActionRequest, DispatchActionResponse, DispatchEventRequest, DispatchEventResponse,
    SubscribeEventRequest,
};
use service_protos::ubo::v1::{Action, Event};
use service_protos::StoreServiceClient;
use std::path::{Path, PathBuf};
use tonic::transport::{Channel, Endpoint, Uri};
use tonic::{Request, Status};

/// Events of one subscription, in arrival order. Ends on end-of-stream; an
/// `Err` item reports a transport failure.
pub type EventStream = BoxStream<'static, Result<Event, Status>>;

/// The remote store as seen by the client: unary dispatch plus event subscriptions
#[async_trait::async_trait]
pub trait StoreTransport: Send + Sync {
    /// Dispatch an action to the store
    async fn dispatch_action(&self, action: Action) -> Result<DispatchActionResponse, StoreError>;

    /// Dispatch an event to the store
    async fn dispatch_event(&self, event: Event) -> Result<DispatchEventResponse, StoreError>;

    /// Open a server-streaming subscription for one category of events
    async fn subscribe(&self, category: EventCategory) -> Result<EventStream, StoreError>;
}

/// gRPC implementation of [`StoreTransport`].
///
/// The channel connects lazily and reconnects on demand, so creating a store
/// never fails because the server is down; the first call does.
#[derive(Clone)]
pub struct GrpcStore {
    client: StoreServiceClient<Channel>,
}

impl GrpcStore {
    /// Create a store for the endpoint described by `config`
    pub fn connect(config: &ClientConfig) -> Result<Self, StoreError> {
        let channel = match &config.unix_socket {
            Some(path) => Self::unix_channel(path)?,
            None => Self::tcp_channel(&config.endpoint_uri())?,
        };
        info!("🔌 Store client ready for {}", config.target());
        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            client: StoreServiceClient::new(channel),
        }
    }

    fn tcp_channel(uri: &str) -> Result<Channel, StoreError> {
        let endpoint = Endpoint::from_shared(uri.to_string())
            .map_err(|e| StoreError::InvalidEndpoint(format!("{}: {}", uri, e)))?;
        Ok(endpoint.connect_lazy())
    }

    fn unix_channel(socket_path: &Path) -> Result<Channel, StoreError> {
        let socket_path: PathBuf = socket_path.to_path_buf();
        let connector = tower::service_fn(move |_: Uri| {
            let socket_path = socket_path.clone();
            async move {
                let stream = tokio::net::UnixStream::connect(socket_path).await?;
                Ok::<_, std::io::Error>(hyper_util::rt::tokio::TokioIo::new(stream))
            }
        });

        // The authority is ignored by the connector but must be a valid URI
        let endpoint = Endpoint::try_from("http://[::]:50051")
            .map_err(|e| StoreError::InvalidEndpoint(e.to_string()))?;
        Ok(endpoint.connect_with_connector_lazy(connector))
    }
}

#[async_trait::async_trait]
impl StoreTransport for GrpcStore {
    async fn dispatch_action(&self, action: Action) -> Result<DispatchActionResponse, StoreError> {
        debug!("📤 DispatchAction {:?}", action.action);
        let request = Request::new(DispatchActionRequest {
            action: Some(action),
        });
        let response = self.client.clone().dispatch_action(request).await?;
        Ok(response.into_inner())
    }

    async fn dispatch_event(&self, event: Event) -> Result<DispatchEventResponse, StoreError> {
        debug!("📤 DispatchEvent {:?}", EventCategory::of(&event));
        let request = Request::new(DispatchEventRequest { event: Some(event) });
        let response = self.client.clone().dispatch_event(request).await?;
        Ok(response.into_inner())
    }

    async fn subscribe(&self, category: EventCategory) -> Result<EventStream, StoreError> {
        let request = Request::new(SubscribeEventRequest {
            event: Some(category.filter()),
        });
        let stream = self
            .client
            .clone()
            .subscribe_event(request)
            .await?
            .into_inner();

        // Responses without an event carry nothing to handle
        let events = stream.filter_map(|response| async move {
            match response {
                Ok(response) => response.event.map(Ok),
                Err(status) => Some(Err(status)),
            }
        });
        Ok(events.boxed())
    }
}
