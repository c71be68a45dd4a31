mod test_transport_closed;
mod test_ws_round_trip;
