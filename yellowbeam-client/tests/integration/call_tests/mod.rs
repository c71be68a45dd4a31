mod test_busy_incoming_call_is_rejected;
mod test_stop_disposes_peer;
