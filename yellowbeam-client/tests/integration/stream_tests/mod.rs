mod test_discover_streams;
mod test_viewer_failure;
