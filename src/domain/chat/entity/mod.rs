pub mod form_chat;
