//! Scripted backend and end-to-end build scenarios
