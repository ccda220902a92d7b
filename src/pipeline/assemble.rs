// src/pipeline/assemble.rs

//! Schedule assembly.
//!
//! Folds the raw pages an adapter produced into one [`SubstitutionSchedule`].
//! Each page is assembled on its own and the partial schedules are merged
//! afterwards; days are matched by date, so page order does not matter and a
//! page delivered twice changes nothing.

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::models::{
    AdditionalInfo, ColumnType, RawDay, RawPage, RawRow, ScheduleType, SchoolConfig, Substitution,
    SubstitutionBuilder, SubstitutionSchedule, SubstitutionScheduleDay, labels,
};
use crate::services::cells::{parse_changed_value, plain_text, value_of};
use crate::services::{
    ClassSetResolver, ColorProvider, DateTimeNormalizer, DescriptionParser, TypeClassifier,
};
use crate::utils::split_list;

const TEACHER_SEPARATORS: &[char] = &[',', '/'];

/// Builds schedules from raw pages for one school.
#[derive(Debug, Clone)]
pub struct ScheduleAssembler {
    schedule_type: ScheduleType,
    website: Option<String>,
    roster: Vec<String>,
    teachers: Vec<String>,
    auto_detect_type: bool,
    split_teachers: bool,
    merge_with_different_type: bool,
    dates: DateTimeNormalizer,
    classes: ClassSetResolver,
    types: TypeClassifier,
    colors: ColorProvider,
    descriptions: DescriptionParser,
}

impl ScheduleAssembler {
    /// Create an assembler from a school configuration.
    pub fn new(school: &SchoolConfig) -> Result<Self> {
        let classes = ClassSetResolver::new(
            &school.classes,
            &school.exclude_classes,
            school.class_range.as_ref(),
        )?;

        Ok(Self {
            schedule_type: school.schedule_type,
            website: school.website.clone(),
            roster: school.classes.clone(),
            teachers: school.teachers.clone(),
            auto_detect_type: school.auto_detect_type,
            split_teachers: school.split_teachers,
            merge_with_different_type: school.merge_with_different_type,
            dates: DateTimeNormalizer::default(),
            classes,
            types: TypeClassifier::new(school.colors.keys().cloned()),
            colors: ColorProvider::new(&school.colors),
            descriptions: DescriptionParser::default(),
        })
    }

    /// Replace the date normalizer, e.g. with one using a fixed clock.
    pub fn with_normalizer(mut self, dates: DateTimeNormalizer) -> Self {
        self.dates = dates;
        self
    }

    /// An empty schedule carrying the school's roster.
    pub fn empty_schedule(&self) -> Result<SubstitutionSchedule> {
        let mut schedule = SubstitutionSchedule::from_data(self.schedule_type, self.website.as_deref())?;
        schedule.add_classes(self.classes.expand_class_ranges(&self.roster));
        schedule.add_teachers(self.teachers.iter().cloned());
        Ok(schedule)
    }

    /// Assemble several pages into one schedule.
    ///
    /// Failed pages are logged and skipped as long as one page succeeds.
    /// A credential failure aborts at once; it must not look like an empty
    /// schedule.
    pub fn assemble<I>(&self, pages: I) -> Result<SubstitutionSchedule>
    where
        I: IntoIterator<Item = Result<RawPage>>,
    {
        let mut schedule: Option<SubstitutionSchedule> = None;
        let mut failed = 0;
        let mut last_error = None;

        for (index, page) in pages.into_iter().enumerate() {
            match page.and_then(|page| self.assemble_page(&page)) {
                Ok(partial) => match schedule.as_mut() {
                    Some(schedule) => self.merge(schedule, partial),
                    None => schedule = Some(partial),
                },
                Err(e) if e.is_credentials() => return Err(e),
                Err(e) => {
                    log::warn!("Page {} failed: {}", index + 1, e);
                    failed += 1;
                    last_error = Some(e.to_string());
                }
            }
        }

        match schedule {
            Some(schedule) => {
                log::info!(
                    "Assembled {} day(s), {} substitution(s), {} failed page(s)",
                    schedule.days().len(),
                    schedule.substitution_count(),
                    failed
                );
                Ok(schedule)
            }
            None if failed > 0 => Err(AppError::AllPagesFailed {
                count: failed,
                last: last_error.unwrap_or_default(),
            }),
            None => self.empty_schedule(),
        }
    }

    /// Fold a partial schedule into `target`.
    pub fn merge(&self, target: &mut SubstitutionSchedule, partial: SubstitutionSchedule) {
        target.merge(partial, self.merge_with_different_type);
    }

    /// Assemble a single page.
    pub fn assemble_page(&self, page: &RawPage) -> Result<SubstitutionSchedule> {
        let mut schedule = self.empty_schedule()?;

        if let Some(text) = page.last_change.as_deref() {
            schedule.update_last_change(self.dates.parse_date_time(text), Some(text.trim()));
        }
        schedule.add_classes(self.classes.expand_class_ranges(&page.classes));
        schedule.add_teachers(page.teachers.iter().map(|t| t.trim().to_string()));

        for (index, raw_day) in page.days.iter().enumerate() {
            for day in self.assemble_day(raw_day, index, &mut schedule)? {
                schedule.add_day(day, self.merge_with_different_type);
            }
        }

        for message in &page.messages {
            match message.date.as_deref() {
                Some(date) if !date.trim().is_empty() => {
                    let mut day = self.new_day(date);
                    day.add_message(message.text.as_str());
                    schedule.add_day(day, self.merge_with_different_type);
                }
                _ => schedule.add_additional_info(AdditionalInfo::from_schedule(
                    message.title.clone(),
                    message.text.trim(),
                )),
            }
        }

        let seen_classes: Vec<String> = schedule
            .days()
            .iter()
            .flat_map(|d| d.substitutions())
            .flat_map(|s| s.classes.iter().cloned())
            .collect();
        schedule.add_classes(seen_classes);

        let seen_teachers: Vec<String> = schedule
            .days()
            .iter()
            .flat_map(|d| d.substitutions())
            .flat_map(|s| s.teachers.iter().chain(&s.previous_teachers).cloned())
            .collect();
        schedule.add_teachers(seen_teachers);

        Ok(schedule)
    }

    /// Split one raw day into calendar days.
    ///
    /// Rows carrying their own date start a new day whenever the date
    /// changes. Rows before any date are a structural error.
    fn assemble_day(
        &self,
        raw_day: &RawDay,
        index: usize,
        schedule: &mut SubstitutionSchedule,
    ) -> Result<Vec<SubstitutionScheduleDay>> {
        let mut days = Vec::new();
        let mut current = raw_day
            .date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(|d| self.new_day(d));

        for (row_index, row) in raw_day.rows.iter().enumerate() {
            if let Some(text) = row.text_of(ColumnType::Date) {
                let text = plain_text(text);
                let date = self.dates.parse_date(&text);
                let same = current
                    .as_ref()
                    .is_some_and(|day| day.is_same_day(date, Some(&text)));
                if !same {
                    days.extend(current.take());
                    current = Some(SubstitutionScheduleDay::new(date, Some(text)));
                }
            }

            let Some(day) = current.as_mut() else {
                return Err(AppError::structure(
                    format!("day {}", index + 1),
                    format!("row {} has no date", row_index + 1),
                ));
            };
            if let Some(substitution) = self.build_row(row)? {
                day.add_substitution(substitution, self.merge_with_different_type);
            }
        }
        days.extend(current);

        if let Some(text) = raw_day.last_change.as_deref() {
            let last_change = self.dates.parse_date_time(text);
            for day in &mut days {
                day.update_last_change(last_change, Some(text.trim()));
            }
        }

        match days.first_mut() {
            Some(day) => {
                for message in &raw_day.messages {
                    day.add_message(plain_text(message));
                }
            }
            None => {
                for message in &raw_day.messages {
                    schedule.add_additional_info(AdditionalInfo::from_schedule(
                        None,
                        plain_text(message),
                    ));
                }
            }
        }

        Ok(days)
    }

    fn new_day(&self, text: &str) -> SubstitutionScheduleDay {
        let text = plain_text(text);
        let date: Option<NaiveDate> = self.dates.parse_date(&text);
        if date.is_none() {
            log::debug!("Unknown date '{}', keeping the text", text);
        }
        SubstitutionScheduleDay::new(date, Some(text))
    }

    /// Turn one raw row into a substitution. Rows without any value yield `None`.
    pub fn build_row(&self, row: &RawRow) -> Result<Option<Substitution>> {
        let mut builder = Substitution::builder();
        let mut any_value = false;
        let mut course = None;
        let mut descriptions = Vec::new();
        let mut desc_types = Vec::new();

        for cell in &row.cells {
            let text = cell.text.as_str();
            if value_of(text).is_none() {
                continue;
            }
            any_value = true;

            match cell.column {
                ColumnType::Lesson => {
                    builder.lesson(plain_text(text));
                }
                ColumnType::Subject => {
                    let value = parse_changed_value(text);
                    if let Some(previous) = value.previous {
                        builder.previous_subject(previous);
                    }
                    if let Some(current) = value.current {
                        builder.subject(current);
                    }
                }
                ColumnType::PreviousSubject => {
                    builder.previous_subject(plain_text(text));
                }
                ColumnType::Course => course = value_of(text),
                ColumnType::Type => {
                    builder.kind(plain_text(text));
                }
                ColumnType::TypeEntfall => {
                    builder.kind(labels::CANCELLATION);
                }
                ColumnType::Room => {
                    let value = parse_changed_value(text);
                    if let Some(previous) = value.previous {
                        builder.previous_room(previous);
                    }
                    if let Some(current) = value.current {
                        builder.room(current);
                    }
                }
                ColumnType::PreviousRoom => {
                    builder.previous_room(plain_text(text));
                }
                ColumnType::Desc => descriptions.push(plain_text(text)),
                ColumnType::DescType => desc_types.push(plain_text(text)),
                ColumnType::Teacher => {
                    let value = parse_changed_value(text);
                    for teacher in self.teachers_of(value.previous.as_deref()) {
                        builder.previous_teacher(teacher);
                    }
                    for teacher in self.teachers_of(value.current.as_deref()) {
                        builder.teacher(teacher);
                    }
                }
                ColumnType::PreviousTeacher => {
                    for teacher in self.teachers_of(Some(&plain_text(text))) {
                        builder.previous_teacher(teacher);
                    }
                }
                ColumnType::SubstitutionFrom => {
                    builder.desc(format!("verlegt von {}", plain_text(text)));
                }
                ColumnType::TeacherTo => {
                    builder.desc(format!("verlegt nach {}", plain_text(text)));
                }
                ColumnType::Class => {
                    builder.classes(self.classes.resolve(&plain_text(text)));
                }
                ColumnType::Date | ColumnType::Ignore => {}
            }
        }

        if !any_value {
            return Ok(None);
        }

        if let Some(course) = course {
            if !builder.has_subject() {
                builder.subject(course);
            }
        }

        let is_teacher_schedule = self.schedule_type == ScheduleType::Teacher;
        for text in &descriptions {
            self.descriptions
                .parse_description(&mut builder, text, is_teacher_schedule);
        }
        for text in &desc_types {
            builder.desc(text.as_str());
            if builder.current_kind().is_none() {
                if let Some(kind) = self.types.classify(text) {
                    builder.kind(kind);
                }
            }
        }

        if builder.current_kind().is_none() && self.auto_detect_type {
            if let Some(kind) = self.auto_detect_type(&builder) {
                builder.kind(kind);
            }
        }

        Ok(Some(builder.build(&self.colors)))
    }

    /// Guess the type of a row that has none.
    ///
    /// The description is classified first; failing that, a value struck
    /// through without replacement means the lesson is cancelled. `None`
    /// leaves the default label to the builder.
    pub fn auto_detect_type(&self, builder: &SubstitutionBuilder) -> Option<String> {
        if let Some(kind) = builder
            .current_desc()
            .and_then(|desc| self.types.classify(&desc))
        {
            return Some(kind);
        }
        builder
            .is_struck_without_replacement()
            .then(|| labels::CANCELLATION.to_string())
    }

    fn teachers_of(&self, text: Option<&str>) -> Vec<String> {
        match text {
            None => Vec::new(),
            Some(text) if self.split_teachers => split_list(text, TEACHER_SEPARATORS),
            Some(text) => vec![text.trim().to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::models::{ClassRangeConfig, RawMessage};

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 2)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .unwrap()
    }

    fn assembler(school: &SchoolConfig) -> ScheduleAssembler {
        ScheduleAssembler::new(school)
            .unwrap()
            .with_normalizer(DateTimeNormalizer::default().with_reference(reference()))
    }

    fn row(pairs: &[(ColumnType, &str)]) -> RawRow {
        RawRow::from_pairs(pairs.iter().map(|(c, t)| (*c, *t)))
    }

    fn page(date: &str, rows: Vec<RawRow>) -> RawPage {
        RawPage {
            last_change: Some("Stand: 01.03.2025 07:30".into()),
            days: vec![RawDay {
                date: Some(date.into()),
                rows,
                ..RawDay::default()
            }],
            ..RawPage::default()
        }
    }

    fn monday() -> RawPage {
        page(
            "Montag, 3. März",
            vec![
                row(&[
                    (ColumnType::Class, "5a"),
                    (ColumnType::Lesson, "1"),
                    (ColumnType::Subject, "Ma"),
                    (ColumnType::Teacher, "SCH"),
                ]),
                row(&[
                    (ColumnType::Class, "6b"),
                    (ColumnType::Lesson, "3"),
                    (ColumnType::Desc, "Mathe Schmidt fällt aus"),
                ]),
            ],
        )
    }

    fn tuesday() -> RawPage {
        page(
            "Dienstag, 4. März",
            vec![row(&[
                (ColumnType::Class, "7c"),
                (ColumnType::Lesson, "2"),
                (ColumnType::Room, "<s>R101</s> R204"),
                (ColumnType::Type, "Raumänderung"),
            ])],
        )
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_assemble_single_page() {
        let a = assembler(&SchoolConfig::default());
        let schedule = a.assemble([Ok(monday())]).unwrap();

        assert_eq!(schedule.days().len(), 1);
        let day = schedule.day(date(3)).unwrap();
        assert_eq!(day.substitution_count(), 2);

        let cancelled: Vec<_> = day.substitutions().filter(|s| s.is_cancelled()).collect();
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].previous_subject.as_deref(), Some("Mathe"));
        assert_eq!(cancelled[0].color, "#F44336");

        assert!(schedule.classes().contains("5a"));
        assert!(schedule.teachers().contains("Schmidt"));
        assert_eq!(
            schedule.last_change,
            NaiveDate::from_ymd_opt(2025, 3, 1).and_then(|d| d.and_hms_opt(7, 30, 0))
        );
    }

    #[test]
    fn test_merge_is_commutative() {
        let a = assembler(&SchoolConfig::default());
        let forward = a.assemble([Ok(monday()), Ok(tuesday())]).unwrap();
        let backward = a.assemble([Ok(tuesday()), Ok(monday())]).unwrap();

        assert_eq!(forward.days().len(), 2);
        assert_eq!(forward.days(), backward.days());
        assert_eq!(forward, backward);
    }

    fn same_date_page(message: &str, info: &str, rows: Vec<RawRow>) -> RawPage {
        let mut raw = page("03.03.2025", rows);
        raw.days[0].messages = vec![message.into()];
        raw.messages = vec![RawMessage {
            title: None,
            text: info.into(),
            date: None,
        }];
        raw
    }

    #[test]
    fn test_same_date_pages_in_any_order() {
        let school = SchoolConfig {
            merge_with_different_type: true,
            ..SchoolConfig::default()
        };
        let a = assembler(&school);
        let lesson = |class: &str, kind: &str| {
            row(&[
                (ColumnType::Class, class),
                (ColumnType::Lesson, "1"),
                (ColumnType::Subject, "Ma"),
                (ColumnType::Type, kind),
            ])
        };
        let pages = [
            same_date_page("Aula gesperrt", "Info eins", vec![lesson("5a", "Entfall")]),
            same_date_page("Wandertag 7a", "Info zwei", vec![lesson("5a", "Vertretung")]),
            same_date_page("Aula gesperrt", "Info drei", vec![lesson("5b", "Entfall")]),
        ];
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

        let schedules: Vec<_> = orders
            .iter()
            .map(|order| {
                a.assemble(order.iter().map(|&i| Ok(pages[i].clone())))
                    .unwrap()
            })
            .collect();

        for schedule in &schedules[1..] {
            assert_eq!(schedule, &schedules[0]);
            assert_eq!(
                crate::pipeline::fingerprint(schedule).unwrap(),
                crate::pipeline::fingerprint(&schedules[0]).unwrap()
            );
        }

        let day = schedules[0].day(date(3)).unwrap();
        assert_eq!(day.messages().len(), 2);
        assert_eq!(day.substitution_count(), 2);
        assert_eq!(schedules[0].additional_infos().len(), 3);
    }

    #[test]
    fn test_same_page_twice_is_idempotent() {
        let a = assembler(&SchoolConfig::default());
        let once = a.assemble([Ok(monday())]).unwrap();
        let twice = a.assemble([Ok(monday()), Ok(monday())]).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_row_dates_split_days() {
        let a = assembler(&SchoolConfig::default());
        let raw = RawPage {
            days: vec![RawDay {
                date: None,
                rows: vec![
                    row(&[(ColumnType::Date, "03.03."), (ColumnType::Lesson, "1")]),
                    row(&[(ColumnType::Date, "03.03."), (ColumnType::Lesson, "2")]),
                    row(&[(ColumnType::Date, "04.03."), (ColumnType::Lesson, "1")]),
                ],
                messages: vec!["Bitte Aushang beachten".into()],
                ..RawDay::default()
            }],
            ..RawPage::default()
        };

        let schedule = a.assemble_page(&raw).unwrap();
        assert_eq!(schedule.days().len(), 2);
        assert_eq!(schedule.day(date(3)).unwrap().substitution_count(), 2);
        assert_eq!(schedule.day(date(4)).unwrap().substitution_count(), 1);
        assert!(
            schedule
                .day(date(3))
                .unwrap()
                .messages()
                .contains("Bitte Aushang beachten")
        );
    }

    #[test]
    fn test_row_without_any_date_is_structural_error() {
        let a = assembler(&SchoolConfig::default());
        let raw = RawPage {
            days: vec![RawDay {
                rows: vec![row(&[(ColumnType::Lesson, "1")])],
                ..RawDay::default()
            }],
            ..RawPage::default()
        };
        assert!(matches!(
            a.assemble_page(&raw),
            Err(AppError::Structure { .. })
        ));
    }

    #[test]
    fn test_unknown_date_kept_by_text() {
        let a = assembler(&SchoolConfig::default());
        let schedule = a.assemble_page(&page("nächste Woche", vec![])).unwrap();
        assert_eq!(schedule.days().len(), 1);
        assert_eq!(schedule.days()[0].date, None);
        assert_eq!(
            schedule.days()[0].date_string.as_deref(),
            Some("nächste Woche")
        );
    }

    #[test]
    fn test_partial_failure_keeps_good_pages() {
        let a = assembler(&SchoolConfig::default());
        let schedule = a
            .assemble([
                Err(AppError::structure("page", "broken")),
                Ok(monday()),
            ])
            .unwrap();
        assert_eq!(schedule.days().len(), 1);
    }

    #[test]
    fn test_all_pages_failed() {
        let a = assembler(&SchoolConfig::default());
        let result = a.assemble([
            Err(AppError::structure("page 1", "broken")),
            Err(AppError::structure("page 2", "broken")),
        ]);
        assert!(matches!(result, Err(AppError::AllPagesFailed { count: 2, .. })));
    }

    #[test]
    fn test_credentials_failure_is_not_an_empty_schedule() {
        let a = assembler(&SchoolConfig::default());
        let result = a.assemble([Ok(monday()), Err(AppError::credentials("401"))]);
        assert!(matches!(result, Err(AppError::Credentials(_))));
    }

    #[test]
    fn test_no_pages_is_valid_empty_schedule() {
        let a = assembler(&SchoolConfig::default());
        let schedule = a.assemble(Vec::<Result<RawPage>>::new()).unwrap();
        assert!(schedule.days().is_empty());
        assert!(schedule.classes().is_empty());
    }

    #[test]
    fn test_messages_routing() {
        let a = assembler(&SchoolConfig::default());
        let mut raw = monday();
        raw.messages = vec![
            RawMessage {
                title: Some("Hinweis".into()),
                text: "Schulfest am Freitag".into(),
                date: None,
            },
            RawMessage {
                title: None,
                text: "Aula gesperrt".into(),
                date: Some("03.03.2025".into()),
            },
        ];

        let schedule = a.assemble_page(&raw).unwrap();
        let infos: Vec<_> = schedule.additional_infos().iter().collect();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].text, "Schulfest am Freitag");
        let messages: Vec<_> = schedule.day(date(3)).unwrap().messages().iter().collect();
        assert_eq!(messages, ["Aula gesperrt"]);
    }

    #[test]
    fn test_type_column_wins_over_description() {
        let a = assembler(&SchoolConfig::default());
        let sub = a
            .build_row(&row(&[
                (ColumnType::Lesson, "5"),
                (ColumnType::Type, "Klausur"),
                (ColumnType::Desc, "Ma MÜL fällt aus"),
            ]))
            .unwrap()
            .unwrap();
        assert_eq!(sub.kind, "Klausur");
        assert_eq!(sub.previous_subject.as_deref(), Some("Ma"));
    }

    #[test]
    fn test_struck_teacher_without_replacement_is_cancellation() {
        let a = assembler(&SchoolConfig::default());
        let sub = a
            .build_row(&row(&[
                (ColumnType::Lesson, "4"),
                (ColumnType::Subject, "<s>Bio</s>"),
                (ColumnType::Teacher, "<s>MEI</s>"),
            ]))
            .unwrap()
            .unwrap();
        assert_eq!(sub.kind, "Entfall");
        assert_eq!(sub.previous_subject.as_deref(), Some("Bio"));
        assert!(sub.previous_teachers.contains("MEI"));
        assert!(sub.teachers.is_empty());
    }

    #[test]
    fn test_auto_detect_disabled_defaults_to_substitution() {
        let school = SchoolConfig {
            auto_detect_type: false,
            ..SchoolConfig::default()
        };
        let sub = assembler(&school)
            .build_row(&row(&[
                (ColumnType::Subject, "<s>Bio</s>"),
                (ColumnType::Desc, "Raumwechsel"),
            ]))
            .unwrap()
            .unwrap();
        assert_eq!(sub.kind, "Vertretung");
        assert_eq!(sub.desc.as_deref(), Some("Raumwechsel"));
    }

    #[test]
    fn test_auto_detect_uses_description_first() {
        let a = assembler(&SchoolConfig::default());
        let sub = a
            .build_row(&row(&[
                (ColumnType::Subject, "<s>Bio</s>"),
                (ColumnType::Desc, "Raumwechsel"),
            ]))
            .unwrap()
            .unwrap();
        assert_eq!(sub.kind, "Raumänderung");
    }

    #[test]
    fn test_teacher_splitting_toggle() {
        let cells = [(ColumnType::Teacher, "MÜL, SCH")];

        let split = assembler(&SchoolConfig::default())
            .build_row(&row(&cells))
            .unwrap()
            .unwrap();
        assert_eq!(split.teachers.len(), 2);

        let school = SchoolConfig {
            split_teachers: false,
            ..SchoolConfig::default()
        };
        let whole = assembler(&school).build_row(&row(&cells)).unwrap().unwrap();
        assert_eq!(whole.teachers.len(), 1);
        assert!(whole.teachers.contains("MÜL, SCH"));
    }

    #[test]
    fn test_column_semantics() {
        let a = assembler(&SchoolConfig::default());
        let sub = a
            .build_row(&row(&[
                (ColumnType::Course, "D-GK1"),
                (ColumnType::PreviousRoom, "R3"),
                (ColumnType::SubstitutionFrom, "Mo 2. Std."),
                (ColumnType::TypeEntfall, "x"),
                (ColumnType::Ignore, "whatever"),
            ]))
            .unwrap()
            .unwrap();
        assert_eq!(sub.subject.as_deref(), Some("D-GK1"));
        assert_eq!(sub.previous_room.as_deref(), Some("R3"));
        assert_eq!(sub.desc.as_deref(), Some("verlegt von Mo 2. Std."));
        assert_eq!(sub.kind, "Entfall");
    }

    #[test]
    fn test_desc_type_column_classifies() {
        let a = assembler(&SchoolConfig::default());
        let sub = a
            .build_row(&row(&[(ColumnType::DescType, "auf Freitag verschoben")]))
            .unwrap()
            .unwrap();
        assert_eq!(sub.kind, "Verlegung");
        assert_eq!(sub.desc.as_deref(), Some("auf Freitag verschoben"));
    }

    #[test]
    fn test_empty_row_skipped() {
        let a = assembler(&SchoolConfig::default());
        let result = a
            .build_row(&row(&[(ColumnType::Lesson, "---"), (ColumnType::Class, " ")]))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_class_ranges_applied_to_rows() {
        let school = SchoolConfig {
            class_range: Some(ClassRangeConfig {
                range_format: "gc-c".into(),
                single_format: "gc".into(),
                grade_regex: r"\d".into(),
                class_regex: "[A-Z]".into(),
            }),
            ..SchoolConfig::default()
        };
        let sub = assembler(&school)
            .build_row(&row(&[(ColumnType::Class, "7A-C"), (ColumnType::Lesson, "1")]))
            .unwrap()
            .unwrap();
        assert_eq!(sub.classes.len(), 3);
        assert!(sub.classes.contains("7B"));
    }

    #[test]
    fn test_merge_with_different_type_opt_in() {
        let rows = vec![
            row(&[(ColumnType::Class, "5a"), (ColumnType::Lesson, "1"), (ColumnType::Type, "Betreuung")]),
            row(&[(ColumnType::Class, "5a"), (ColumnType::Lesson, "1"), (ColumnType::Type, "Vertretung")]),
        ];

        let kept = assembler(&SchoolConfig::default())
            .assemble_page(&page("03.03.2025", rows.clone()))
            .unwrap();
        assert_eq!(kept.substitution_count(), 2);

        let school = SchoolConfig {
            merge_with_different_type: true,
            ..SchoolConfig::default()
        };
        let merged = assembler(&school)
            .assemble_page(&page("03.03.2025", rows))
            .unwrap();
        assert_eq!(merged.substitution_count(), 1);
        let day = merged.day(date(3)).unwrap();
        assert_eq!(day.substitutions().next().unwrap().kind, "Vertretung");
    }

    #[test]
    fn test_rows_differing_in_class_are_combined() {
        let rows = vec![
            row(&[(ColumnType::Class, "5a"), (ColumnType::Lesson, "1"), (ColumnType::Subject, "Ma")]),
            row(&[(ColumnType::Class, "5b"), (ColumnType::Lesson, "1"), (ColumnType::Subject, "Ma")]),
        ];
        let schedule = assembler(&SchoolConfig::default())
            .assemble_page(&page("03.03.2025", rows))
            .unwrap();
        assert_eq!(schedule.substitution_count(), 1);
        let sub = schedule.day(date(3)).unwrap().substitutions().next().unwrap().clone();
        assert_eq!(sub.classes.len(), 2);
    }
}
