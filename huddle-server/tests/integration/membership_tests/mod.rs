mod test_departing_join_spawns_no_room;
mod test_host_promotion;
mod test_rejected_switch_keeps_membership;
mod test_switching_rooms;
