mod e2e_test;
mod properties_test;
mod reconcile_props;
