// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::{animal::Animal, person::Person};
use std::fmt::{self, Display};

/// The kind of a [`TestData`] value; a natural window key in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataVariant {
    Animal,
    Person,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum TestData {
    Person(Person),
    Animal(Animal),
}

impl TestData {
    #[must_use]
    pub const fn variant(&self) -> DataVariant {
        match self {
            TestData::Person(_) => DataVariant::Person,
            TestData::Animal(_) => DataVariant::Animal,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            TestData::Person(p) => &p.name,
            TestData::Animal(a) => &a.name,
        }
    }
}

pub fn person_alice() -> TestData {
    TestData::Person(Person::new("Alice".to_string(), 25))
}

pub fn person_bob() -> TestData {
    TestData::Person(Person::new("Bob".to_string(), 30))
}

pub fn person_charlie() -> TestData {
    TestData::Person(Person::new("Charlie".to_string(), 35))
}

pub fn person_diane() -> TestData {
    TestData::Person(Person::new("Diane".to_string(), 40))
}

pub fn person_dave() -> TestData {
    TestData::Person(Person::new("Dave".to_string(), 28))
}

pub fn animal_dog() -> TestData {
    TestData::Animal(Animal::new("Dog".to_string(), 4))
}

pub fn animal_spider() -> TestData {
    TestData::Animal(Animal::new("Spider".to_string(), 8))
}

pub fn animal_bird() -> TestData {
    TestData::Animal(Animal::new("Bird".to_string(), 2))
}

pub fn animal_cat() -> TestData {
    TestData::Animal(Animal::new("Cat".to_string(), 4))
}

pub fn animal(name: String, legs: u32) -> TestData {
    TestData::Animal(Animal::new(name, legs))
}

pub fn person(name: String, age: u32) -> TestData {
    TestData::Person(Person::new(name, age))
}

impl Display for TestData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestData::Person(p) => write!(f, "{p}"),
            TestData::Animal(a) => write!(f, "{a}"),
        }
    }
}
