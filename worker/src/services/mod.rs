pub mod expiration_loop;
