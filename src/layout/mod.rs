pub(crate) mod variant;
