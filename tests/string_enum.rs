#[cfg(test)]
mod tests {
    use tabula::{AsValue, StringEnum, StringEnumHandler, TypeHandler, Value};

    #[derive(StringEnum, Clone, Copy, Debug, PartialEq, Eq)]
    enum Level {
        Low,
        #[tabula(name = "mid")]
        Medium,
        High,
    }

    #[derive(StringEnum, Clone, Copy, Debug, PartialEq, Eq)]
    #[tabula(ignore_case)]
    enum Direction {
        North,
        South,
    }

    #[test]
    fn names() {
        assert_eq!(Level::NAMES, ["Low", "mid", "High"]);
        assert_eq!(Level::Medium.name(), "mid");
        assert_eq!(Level::from_ordinal(2), Some(Level::High));
        assert_eq!(Level::from_ordinal(3), None);
    }

    #[test]
    fn to_value() {
        assert_eq!(Level::High.as_value(), Value::Varchar(Some("High".into())));
        assert_eq!(Level::Medium.as_value(), Value::Varchar(Some("mid".into())));
        assert_eq!(Some(Level::Low).as_value(), Value::Varchar(Some("Low".into())));
        assert_eq!(None::<Level>.as_value(), Value::Varchar(None));
    }

    #[test]
    fn from_value() {
        assert_eq!(
            Level::try_from_value(Value::Varchar(Some("mid".into()))).unwrap(),
            Level::Medium
        );
        assert!(Level::try_from_value(Value::Varchar(Some("Medium".into()))).is_err());
        assert!(Level::try_from_value(Value::Varchar(Some("high".into()))).is_err());
        assert_eq!(
            Option::<Level>::try_from_value(Value::Varchar(None)).unwrap(),
            None
        );
        assert_eq!(
            Direction::try_from_value(Value::Varchar(Some("NORTH".into()))).unwrap(),
            Direction::North
        );
    }

    #[test]
    fn handler() {
        let handler = StringEnumHandler::<Level>::new(true);
        assert_eq!(
            handler.from_storage(&Value::Varchar(Some("LOW".into()))).unwrap(),
            Some(Level::Low)
        );
        assert_eq!(handler.from_storage(&Value::Null).unwrap(), None);
        assert_eq!(handler.to_storage(None), Value::Null);
        assert_eq!(
            handler.to_storage(Some(&Level::High)),
            Value::Varchar(Some("High".into()))
        );
    }
}
