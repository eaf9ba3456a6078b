mod add;
mod clients;
mod health_check;
mod helpers;
mod workflow;
