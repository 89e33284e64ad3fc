mod accounts;
mod harness;
mod movies;
