mod test_affected;
