mod property {
    pub mod strategies;
    mod condition;
    mod edit;
    mod roundtrip;
    mod template;
}
