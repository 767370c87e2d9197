mod test_attach_after_description;
mod test_offer_then_answer;
mod test_wrong_kind_is_rejected;
