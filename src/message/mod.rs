pub mod message_dto;
pub mod message_handlers;
pub mod message_models;
pub mod message_repository;
pub mod message_service;

pub use message_dto::{
    ConversationSummary, MarkReadRequest, MessageHistoryResponse, MessageResponse,
    SendMessageRequest,
};
pub use message_handlers::{get_conversations, get_history, mark_conversation_read, send_message};
pub use message_models::{Message, MessageRead};
pub use message_repository::MessageRepository;
pub use message_service::MessageService;
