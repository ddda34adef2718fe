mod login;
mod root;
mod users;
