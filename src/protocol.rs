//! Client <-> server websocket protocol. Every frame is one JSON-encoded
//! [`AppCmd`] (client to server) or [`AppEvent`] (server to client).

use serde::{Deserialize, Serialize};
use whispers_contract::{ProposalInfo, UserInfo};

use crate::{comment::Comment, feedback_form::FormSnapshot, notification::Notification};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppCmd {
    SubmitFeedback { author: String, content: String },
    RegisterUser,
    CreateProposal { deadline: u64 },
    CloseProposal { proposal_id: u64 },
    GetUserInfo,
    GetUserFeedbacks,
    GetProposalInfo { proposal_id: u64 },
    GetProposalFeedbacks { proposal_id: u64 },
    ListComments,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppEvent {
    Comments(Vec<Comment>),
    CommentAdded(Comment),
    Form(FormSnapshot),
    Notification(Notification),
    UserInfo(Option<UserInfo>),
    UserFeedbacks(Option<Vec<u64>>),
    ProposalInfo(ProposalInfo),
    ProposalFeedbacks(Vec<u64>),
    TxSent { tx_hash: String },
    Error(String),
}
