pub mod form_submission;
