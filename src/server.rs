use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::{net::SocketAddr, sync::Arc};
use tokio::{
    sync::{
        broadcast::{self, error::RecvError},
        mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
        Mutex,
    },
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use whispers_contract::FeedbackContractService;

use crate::{
    adapter::ContractAdapter,
    comment::{Comment, CommentThread, SharedThread},
    error::{FormError, ServerError},
    feedback_form::{submit_typed_feedback, FeedbackForm},
    notification::Notifier,
    page::render_page,
    protocol::{AppCmd, AppEvent},
    thread_view::render_thread_text,
    wallet::WalletSession,
};

/// State shared by every request and websocket session.
pub struct AppState<C> {
    pub contract: Arc<C>,
    pub wallet: WalletSession,
    pub thread: SharedThread,
    pub proposal_id: u64,
    pub rating: u8,
}

impl<C> AppState<C> {
    pub fn new(contract: C, wallet: WalletSession, proposal_id: u64, rating: u8) -> Self {
        Self {
            contract: Arc::new(contract),
            wallet,
            thread: SharedThread::new(CommentThread::seeded()),
            proposal_id,
            rating,
        }
    }
}

pub fn router<C>(state: Arc<AppState<C>>) -> Router
where
    C: FeedbackContractService + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(index::<C>))
        .route("/comments", get(list_comments::<C>))
        .route("/ws", get(ws_handler::<C>))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves in the background. Returns the bound address
/// (useful with port 0) and the server task.
pub fn bind<C>(
    addr: SocketAddr,
    state: Arc<AppState<C>>,
) -> Result<(SocketAddr, JoinHandle<Result<(), ServerError>>), ServerError>
where
    C: FeedbackContractService + Send + Sync + 'static,
{
    let server = axum::Server::try_bind(&addr)
        .map_err(|e| ServerError::BindError(e.to_string()))?
        .serve(router(state).into_make_service());
    let local_addr = server.local_addr();
    info!("Listening on http://{local_addr}");

    let handle = tokio::spawn(async move {
        server
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))
    });
    Ok((local_addr, handle))
}

async fn index<C>(State(state): State<Arc<AppState<C>>>) -> Html<String>
where
    C: FeedbackContractService + Send + Sync + 'static,
{
    let comments = state.thread.snapshot().await;
    let form = FeedbackForm::new(state.proposal_id, state.rating)
        .snapshot(state.wallet.is_connected(), false);
    Html(render_page(&comments, &state.wallet, &form))
}

async fn list_comments<C>(State(state): State<Arc<AppState<C>>>) -> Json<Vec<Comment>>
where
    C: FeedbackContractService + Send + Sync + 'static,
{
    Json(state.thread.snapshot().await)
}

async fn ws_handler<C>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<C>>>,
) -> impl IntoResponse
where
    C: FeedbackContractService + Send + Sync + 'static,
{
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// One websocket connection: its own form, adapter and notifications, the
/// shared thread.
struct Session<C> {
    state: Arc<AppState<C>>,
    adapter: ContractAdapter<C>,
    form: Mutex<FeedbackForm>,
    events: UnboundedSender<AppEvent>,
}

impl<C> Session<C>
where
    C: FeedbackContractService + Send + Sync + 'static,
{
    fn push(&self, event: AppEvent) {
        // Writer gone means the socket closed
        let _ = self.events.send(event);
    }

    async fn push_form(&self) {
        let snapshot = self.form.lock().await.snapshot(
            self.adapter.wallet().is_connected(),
            self.adapter.is_pending(),
        );
        self.push(AppEvent::Form(snapshot));
    }

    async fn handle_cmd(&self, cmd: AppCmd) {
        match cmd {
            AppCmd::SubmitFeedback { author, content } => {
                match submit_typed_feedback(
                    &self.form,
                    &self.adapter,
                    &self.state.thread,
                    &author,
                    &content,
                )
                .await
                {
                    Ok(comment) => info!("Feedback {} appended to thread", comment.id),
                    Err(FormError::AlreadySubmitting) => {
                        self.push(AppEvent::Error(FormError::AlreadySubmitting.to_string()))
                    }
                    Err(err) => info!("Feedback not submitted: {err}"),
                }
                self.push_form().await;
            }
            AppCmd::RegisterUser => {
                if let Ok(tx_hash) = self.adapter.register_user().await {
                    self.push(AppEvent::TxSent {
                        tx_hash: tx_hash.to_string(),
                    });
                }
            }
            AppCmd::CreateProposal { deadline } => {
                if let Ok(tx_hash) = self.adapter.create_proposal(deadline).await {
                    self.push(AppEvent::TxSent {
                        tx_hash: tx_hash.to_string(),
                    });
                }
            }
            AppCmd::CloseProposal { proposal_id } => {
                if let Ok(tx_hash) = self.adapter.close_proposal(proposal_id).await {
                    self.push(AppEvent::TxSent {
                        tx_hash: tx_hash.to_string(),
                    });
                }
            }
            AppCmd::GetUserInfo => match self.adapter.get_user_info().await {
                Ok(info) => self.push(AppEvent::UserInfo(info)),
                Err(err) => self.push(AppEvent::Error(err.to_string())),
            },
            AppCmd::GetUserFeedbacks => match self.adapter.get_user_feedbacks().await {
                Ok(ids) => self.push(AppEvent::UserFeedbacks(ids)),
                Err(err) => self.push(AppEvent::Error(err.to_string())),
            },
            AppCmd::GetProposalInfo { proposal_id } => {
                match self.adapter.get_proposal_info(proposal_id).await {
                    Ok(info) => self.push(AppEvent::ProposalInfo(info)),
                    Err(err) => self.push(AppEvent::Error(err.to_string())),
                }
            }
            AppCmd::GetProposalFeedbacks { proposal_id } => {
                match self.adapter.get_proposal_feedbacks(proposal_id).await {
                    Ok(ids) => self.push(AppEvent::ProposalFeedbacks(ids)),
                    Err(err) => self.push(AppEvent::Error(err.to_string())),
                }
            }
            AppCmd::ListComments => {
                self.push(AppEvent::Comments(self.state.thread.snapshot().await));
            }
        }
    }
}

async fn handle_socket<C>(socket: WebSocket, state: Arc<AppState<C>>)
where
    C: FeedbackContractService + Send + Sync + 'static,
{
    let (ws_sender, mut ws_receiver) = socket.split();
    let (events_tx, events_rx) = unbounded_channel();
    let notifier = {
        let events_tx = events_tx.clone();
        Notifier::new(move |notification| {
            let _ = events_tx.send(AppEvent::Notification(notification));
        })
    };

    let session = Arc::new(Session {
        adapter: ContractAdapter::new(state.contract.clone(), state.wallet.clone(), notifier),
        form: Mutex::new(FeedbackForm::new(state.proposal_id, state.rating)),
        events: events_tx,
        state: state.clone(),
    });

    let (comments, added_rx) = state.thread.subscribe().await;
    debug!("Thread on connect:\n{}", render_thread_text(&comments));
    session.push(AppEvent::Comments(comments));
    session.push_form().await;

    let cancel = CancellationToken::new();
    let writer = tokio::spawn(forward_events(
        ws_sender,
        events_rx,
        state.clone(),
        added_rx,
        cancel.clone(),
    ));

    info!("Websocket session opened");
    while let Some(Ok(msg)) = ws_receiver.next().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<AppCmd>(&text) {
                Ok(cmd) => {
                    let session = session.clone();
                    tokio::spawn(async move { session.handle_cmd(cmd).await });
                }
                Err(err) => {
                    warn!("Malformed command: {err}");
                    session.push(AppEvent::Error(format!("Malformed command: {err}")));
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    cancel.cancel();
    match writer.await {
        Ok(Err(err)) => error!("Websocket writer stopped: {err}"),
        Err(err) => error!("Websocket writer task failed: {err}"),
        Ok(Ok(())) => {}
    }
    info!("Websocket session closed");
}

/// Session events keep their order; thread updates from other sessions are
/// interleaved between them. A session that falls behind the thread gets the
/// whole list again instead of the comments it missed.
async fn forward_events<C>(
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut events: UnboundedReceiver<AppEvent>,
    state: Arc<AppState<C>>,
    mut added: broadcast::Receiver<Comment>,
    cancel: CancellationToken,
) -> Result<(), ServerError> {
    loop {
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            Some(event) = events.recv() => event,
            res = added.recv() => match res {
                Ok(comment) => AppEvent::CommentAdded(comment),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Session lagged behind thread updates by {skipped} comments, resending thread");
                    AppEvent::Comments(state.thread.resubscribe(&mut added).await)
                }
                Err(RecvError::Closed) => break,
            },
        };
        let text = serde_json::to_string(&event)?;
        ws_sender.send(Message::Text(text)).await?;
    }
    Ok(())
}
