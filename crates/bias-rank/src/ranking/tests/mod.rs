mod common;
mod composite;
mod fit;
mod profile;
