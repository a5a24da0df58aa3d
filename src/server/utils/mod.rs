pub mod browser_headers;
