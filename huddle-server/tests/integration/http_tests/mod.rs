mod test_rooms_api;
